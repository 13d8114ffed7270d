//! Sibling circle packing and minimal enclosing circles.
//!
//! Circles are placed one at a time tangent to two members of a front chain,
//! backing off along the chain whenever the candidate intersects an earlier
//! circle. The enclosing circle is found with an incremental basis search
//! over a shuffled copy of the input; the shuffle uses a fixed-seed LCG so the
//! result depends only on the radii and their order.

/// A circle in the local frame of whatever is being packed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl Circle {
    pub fn new(x: f64, y: f64, r: f64) -> Self {
        Self { x, y, r }
    }

    pub fn with_radius(r: f64) -> Self {
        Self { x: 0.0, y: 0.0, r }
    }
}

/// Packs `circles` with at least `padding` between neighbours and returns the
/// enclosing circle. The enclosing radius is measured on the radii inflated by
/// `padding / 2`, so it overstates the true footprint by that amount.
pub fn pack_with_padding(circles: &mut [Circle], padding: f64) -> Circle {
    if circles.is_empty() {
        return Circle::default();
    }
    let inflate = padding.max(0.0) / 2.0;
    for circle in circles.iter_mut() {
        circle.r += inflate;
    }

    pack_siblings(circles);
    let enclosing = pack_enclose(circles);

    for circle in circles.iter_mut() {
        circle.r -= inflate;
    }
    enclosing
}

/// Positions `circles` so that none overlap and the enclosing circle of the
/// result is centred on the origin. Returns the enclosing radius.
pub fn pack_siblings(circles: &mut [Circle]) -> f64 {
    pack_siblings_with(circles, &mut Lcg::new())
}

/// Smallest circle containing every circle in `circles`. Empty input yields a
/// zero circle at the origin.
pub fn pack_enclose(circles: &[Circle]) -> Circle {
    pack_enclose_with(circles, &mut Lcg::new())
}

struct Lcg {
    state: u64,
}

impl Lcg {
    const A: u64 = 1_664_525;
    const C: u64 = 1_013_904_223;
    const M: u64 = 1 << 32;

    fn new() -> Self {
        Self { state: 1 }
    }

    fn next_f64(&mut self) -> f64 {
        self.state = (Self::A * self.state + Self::C) % Self::M;
        self.state as f64 / Self::M as f64
    }
}

fn pack_siblings_with(circles: &mut [Circle], random: &mut Lcg) -> f64 {
    let n = circles.len();
    if n == 0 {
        return 0.0;
    }

    circles[0].x = 0.0;
    circles[0].y = 0.0;
    if n == 1 {
        return circles[0].r;
    }

    circles[0].x = -circles[1].r;
    circles[1].x = circles[0].r;
    circles[1].y = 0.0;
    if n == 2 {
        return circles[0].r + circles[1].r;
    }

    let (first, second) = (circles[0], circles[1]);
    place(second, first, &mut circles[2]);

    // Front chain as a circular doubly linked list over circle indices.
    let mut next = vec![0usize; n];
    let mut prev = vec![0usize; n];
    next[0] = 1;
    prev[1] = 0;
    next[1] = 2;
    prev[2] = 1;
    next[2] = 0;
    prev[0] = 2;

    let mut a = 0usize;
    let mut b = 1usize;
    let mut i = 3usize;

    'pack: while i < n {
        let (ca, cb) = (circles[a], circles[b]);
        place(ca, cb, &mut circles[i]);
        let c = i;

        // Closest intersecting circle on the front chain, measured by
        // distance along the chain in either direction.
        let mut j = next[b];
        let mut k = prev[a];
        let mut sj = circles[b].r;
        let mut sk = circles[a].r;
        loop {
            if sj <= sk {
                if intersects(&circles[j], &circles[c]) {
                    b = j;
                    next[a] = b;
                    prev[b] = a;
                    continue 'pack;
                }
                sj += circles[j].r;
                j = next[j];
            } else {
                if intersects(&circles[k], &circles[c]) {
                    a = k;
                    next[a] = b;
                    prev[b] = a;
                    continue 'pack;
                }
                sk += circles[k].r;
                k = prev[k];
            }
            if j == next[k] {
                break;
            }
        }

        prev[c] = a;
        next[c] = b;
        next[a] = c;
        prev[b] = c;
        b = c;

        // Pair on the chain closest to the centroid.
        let mut best = score(circles, a, next[a]);
        let mut cur = next[c];
        while cur != b {
            let candidate = score(circles, cur, next[cur]);
            if candidate < best {
                a = cur;
                best = candidate;
            }
            cur = next[cur];
        }
        b = next[a];
        i += 1;
    }

    let mut chain = vec![circles[b]];
    let mut cur = next[b];
    while cur != b {
        chain.push(circles[cur]);
        cur = next[cur];
    }
    let enclosing = pack_enclose_with(&chain, random);

    for circle in circles.iter_mut() {
        circle.x -= enclosing.x;
        circle.y -= enclosing.y;
    }
    enclosing.r
}

/// Places `c` tangent to both `a` and `b`.
fn place(b: Circle, a: Circle, c: &mut Circle) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let d2 = dx * dx + dy * dy;
    if d2 == 0.0 {
        c.x = a.x + c.r;
        c.y = a.y;
        return;
    }

    let a2 = (a.r + c.r) * (a.r + c.r);
    let b2 = (b.r + c.r) * (b.r + c.r);
    if a2 > b2 {
        let x = (d2 + b2 - a2) / (2.0 * d2);
        let y = (b2 / d2 - x * x).max(0.0).sqrt();
        c.x = b.x - x * dx - y * dy;
        c.y = b.y - x * dy + y * dx;
    } else {
        let x = (d2 + a2 - b2) / (2.0 * d2);
        let y = (a2 / d2 - x * x).max(0.0).sqrt();
        c.x = a.x + x * dx - y * dy;
        c.y = a.y + x * dy + y * dx;
    }
}

fn intersects(a: &Circle, b: &Circle) -> bool {
    let dr = a.r + b.r - 1e-6;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

fn score(circles: &[Circle], node: usize, next: usize) -> f64 {
    let a = &circles[node];
    let b = &circles[next];
    let ab = a.r + b.r;
    let dx = (a.x * b.r + b.x * a.r) / ab;
    let dy = (a.y * b.r + b.y * a.r) / ab;
    dx * dx + dy * dy
}

fn pack_enclose_with(circles: &[Circle], random: &mut Lcg) -> Circle {
    let mut shuffled = circles.to_vec();
    shuffle(&mut shuffled, random);

    let mut basis: Vec<Circle> = Vec::new();
    let mut enclosing: Option<Circle> = None;
    let mut i = 0;
    while i < shuffled.len() {
        let p = shuffled[i];
        if enclosing.is_some_and(|e| encloses_weak(&e, &p)) {
            i += 1;
            continue;
        }
        match extend_basis(&basis, p) {
            Some(extended) => {
                basis = extended;
                enclosing = Some(enclose_basis(&basis));
                i = 0;
            }
            None => {
                tracing::debug!(count = circles.len(), "enclosing basis search failed");
                return bounding_fallback(circles);
            }
        }
    }

    enclosing.unwrap_or_default()
}

fn shuffle(items: &mut [Circle], random: &mut Lcg) {
    let mut m = items.len();
    while m > 0 {
        let i = (random.next_f64() * m as f64) as usize;
        m -= 1;
        items.swap(m, i);
    }
}

fn extend_basis(basis: &[Circle], p: Circle) -> Option<Vec<Circle>> {
    if encloses_weak_all(&p, basis) {
        return Some(vec![p]);
    }

    for &b in basis {
        if encloses_not(&p, &b) && encloses_weak_all(&enclose_basis2(&b, &p), basis) {
            return Some(vec![b, p]);
        }
    }

    for i in 0..basis.len().saturating_sub(1) {
        for j in (i + 1)..basis.len() {
            let (bi, bj) = (basis[i], basis[j]);
            if encloses_not(&enclose_basis2(&bi, &bj), &p)
                && encloses_not(&enclose_basis2(&bi, &p), &bj)
                && encloses_not(&enclose_basis2(&bj, &p), &bi)
                && encloses_weak_all(&enclose_basis3(&bi, &bj, &p), basis)
            {
                return Some(vec![bi, bj, p]);
            }
        }
    }

    None
}

fn encloses_not(a: &Circle, b: &Circle) -> bool {
    let dr = a.r - b.r;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr < 0.0 || dr * dr < dx * dx + dy * dy
}

fn encloses_weak(a: &Circle, b: &Circle) -> bool {
    let dr = a.r - b.r + a.r.max(b.r).max(1.0) * 1e-9;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

fn encloses_weak_all(a: &Circle, basis: &[Circle]) -> bool {
    basis.iter().all(|b| encloses_weak(a, b))
}

fn enclose_basis(basis: &[Circle]) -> Circle {
    match basis {
        [a] => *a,
        [a, b] => enclose_basis2(a, b),
        [a, b, c] => enclose_basis3(a, b, c),
        _ => Circle::default(),
    }
}

fn enclose_basis2(a: &Circle, b: &Circle) -> Circle {
    let x21 = b.x - a.x;
    let y21 = b.y - a.y;
    let r21 = b.r - a.r;
    let l = (x21 * x21 + y21 * y21).sqrt();
    if l == 0.0 {
        return if a.r >= b.r { *a } else { *b };
    }
    Circle {
        x: (a.x + b.x + x21 / l * r21) / 2.0,
        y: (a.y + b.y + y21 / l * r21) / 2.0,
        r: (l + a.r + b.r) / 2.0,
    }
}

fn enclose_basis3(a: &Circle, b: &Circle, c: &Circle) -> Circle {
    let (x1, y1, r1) = (a.x, a.y, a.r);
    let (x2, y2, r2) = (b.x, b.y, b.r);
    let (x3, y3, r3) = (c.x, c.y, c.r);
    let a2 = x1 - x2;
    let a3 = x1 - x3;
    let b2 = y1 - y2;
    let b3 = y1 - y3;
    let c2 = r2 - r1;
    let c3 = r3 - r1;
    let d1 = x1 * x1 + y1 * y1 - r1 * r1;
    let d2 = d1 - x2 * x2 - y2 * y2 + r2 * r2;
    let d3 = d1 - x3 * x3 - y3 * y3 + r3 * r3;
    let ab = a3 * b2 - a2 * b3;
    let xa = (b2 * d3 - b3 * d2) / (ab * 2.0) - x1;
    let xb = (b3 * c2 - b2 * c3) / ab;
    let ya = (a3 * d2 - a2 * d3) / (ab * 2.0) - y1;
    let yb = (a2 * c3 - a3 * c2) / ab;
    let qa = xb * xb + yb * yb - 1.0;
    let qb = 2.0 * (r1 + xa * xb + ya * yb);
    let qc = xa * xa + ya * ya - r1 * r1;
    let r = -(if qa.abs() > 1e-6 {
        (qb + (qb * qb - 4.0 * qa * qc).sqrt()) / (2.0 * qa)
    } else {
        qc / qb
    });
    Circle {
        x: x1 + xa + xb * r,
        y: y1 + ya + yb * r,
        r,
    }
}

/// Centroid-based circle covering everything; only used when the basis search
/// runs into degenerate (collinear) input.
fn bounding_fallback(circles: &[Circle]) -> Circle {
    if circles.is_empty() {
        return Circle::default();
    }
    let n = circles.len() as f64;
    let cx = circles.iter().map(|c| c.x).sum::<f64>() / n;
    let cy = circles.iter().map(|c| c.y).sum::<f64>() / n;
    let r = circles
        .iter()
        .map(|c| ((c.x - cx).powi(2) + (c.y - cy).powi(2)).sqrt() + c.r)
        .fold(0.0, f64::max);
    Circle::new(cx, cy, r)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn distance(a: &Circle, b: &Circle) -> f64 {
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }

    fn assert_no_overlap(circles: &[Circle], gap: f64) {
        for i in 0..circles.len() {
            for j in (i + 1)..circles.len() {
                let d = distance(&circles[i], &circles[j]);
                assert!(
                    d + 1e-4 >= circles[i].r + circles[j].r + gap,
                    "circles {i} and {j} overlap: d={d}"
                );
            }
        }
    }

    fn assert_encloses(outer: &Circle, circles: &[Circle]) {
        for (idx, c) in circles.iter().enumerate() {
            assert!(
                distance(outer, c) + c.r <= outer.r + 1e-4,
                "circle {idx} escapes the enclosing circle"
            );
        }
    }

    #[test]
    fn empty_input_is_zero_circle() {
        let mut circles: Vec<Circle> = Vec::new();
        assert_eq!(pack_with_padding(&mut circles, 10.0), Circle::default());
        assert_eq!(pack_siblings(&mut circles), 0.0);
        assert_eq!(pack_enclose(&circles), Circle::default());
    }

    #[test]
    fn single_circle_sits_on_origin() {
        let mut circles = vec![Circle::with_radius(7.0)];
        let enclosing = pack_with_padding(&mut circles, 4.0);
        assert_eq!(circles[0].r, 7.0);
        assert!(circles[0].x.abs() < EPS && circles[0].y.abs() < EPS);
        assert!((enclosing.r - 9.0).abs() < EPS);
    }

    #[test]
    fn two_circles_are_tangent() {
        let mut circles = vec![Circle::with_radius(3.0), Circle::with_radius(5.0)];
        let r = pack_siblings(&mut circles);
        assert!((r - 8.0).abs() < EPS);
        assert!((distance(&circles[0], &circles[1]) - 8.0).abs() < EPS);
        let enclosing = pack_enclose(&circles);
        assert!((enclosing.r - 8.0).abs() < EPS);
        assert_encloses(&enclosing, &circles);
    }

    #[test]
    fn equal_circles_pack_without_overlap() {
        let mut circles: Vec<Circle> = (0..40).map(|_| Circle::with_radius(10.0)).collect();
        let r = pack_siblings(&mut circles);
        assert_no_overlap(&circles, 0.0);
        let outer = Circle::new(0.0, 0.0, r);
        assert_encloses(&outer, &circles);
    }

    #[test]
    fn padding_separates_neighbours() {
        let radii = [10.0, 40.0, 25.0, 10.0, 60.0, 5.0, 33.0];
        let mut circles: Vec<Circle> = radii.iter().map(|r| Circle::with_radius(*r)).collect();
        let enclosing = pack_with_padding(&mut circles, 20.0);
        for (circle, r) in circles.iter().zip(radii) {
            assert_eq!(circle.r, r);
        }
        assert_no_overlap(&circles, 20.0);
        let inflated: Vec<Circle> = circles
            .iter()
            .map(|c| Circle::new(c.x, c.y, c.r + 10.0))
            .collect();
        assert_encloses(&enclosing, &inflated);
    }

    #[test]
    fn packing_is_deterministic() {
        let radii = [12.0, 3.0, 9.0, 9.0, 30.0, 1.0, 14.0, 2.5];
        let run = || {
            let mut circles: Vec<Circle> = radii.iter().map(|r| Circle::with_radius(*r)).collect();
            let enclosing = pack_with_padding(&mut circles, 6.0);
            (circles, enclosing)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn enclose_of_nested_circles_is_outer() {
        let circles = [Circle::new(0.0, 0.0, 10.0), Circle::new(1.0, 1.0, 2.0)];
        let enclosing = pack_enclose(&circles);
        assert!((enclosing.r - 10.0).abs() < EPS);
    }
}
