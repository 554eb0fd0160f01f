use ecotopo::algorithms::adjacency::{build_neighbors, AdjacencyOptions, AdjacencyPredicate, CandidateStrategy};
use ecotopo::algorithms::decode::{Decoder, EscapeTable};
use ecotopo::algorithms::dissolve::{dissolve, DissolveOptions};
use ecotopo::algorithms::repair::repair;
use ecotopo::algorithms::simplify::{max_deviation, simplify, SimplifyStats};
use ecotopo::model::{Code, DecodedFeature, RawFeature};
use geo::{polygon, Area, BooleanOps, Coord, LineString, MultiPolygon, Polygon};
use proptest::prelude::*;

#[cfg(feature = "long-props")]
const CASES: u32 = 2_000;
#[cfg(not(feature = "long-props"))]
const CASES: u32 = 64;

fn rect_mp(x: u8, y: u8, w: u8, h: u8) -> MultiPolygon<f64> {
    let (x0, y0) = (x as f64, y as f64);
    let (x1, y1) = (x0 + w as f64, y0 + h as f64);
    MultiPolygon::new(vec![polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1), (x: x0, y: y0)]])
}

fn rects_strategy() -> impl Strategy<Value = Vec<(u8, u8, u8, u8)>> {
    prop::collection::vec((0u8..8, 0u8..8, 1u8..4, 1u8..4), 1..14)
}

fn features(rects: &[(u8, u8, u8, u8)]) -> Vec<DecodedFeature> {
    rects
        .iter()
        .enumerate()
        .map(|(i, &(x, y, w, h))| DecodedFeature {
            raw_id: (i + 1).to_string(),
            code: i as u64 + 1,
            geometry: rect_mp(x, y, w, h),
        })
        .collect()
}

// Star-shaped ring around (50, 50); always simple.
fn star(radii: &[f64]) -> MultiPolygon<f64> {
    let m = radii.len();
    let mut coords: Vec<Coord<f64>> = radii
        .iter()
        .enumerate()
        .map(|(k, r)| {
            let a = k as f64 * std::f64::consts::TAU / m as f64;
            Coord { x: 50.0 + r * a.cos(), y: 50.0 + r * a.sin() }
        })
        .collect();
    coords.push(coords[0]);
    MultiPolygon::new(vec![Polygon::new(LineString::new(coords), Vec::new())])
}

#[derive(Clone, Debug)]
enum Piece {
    Token(u8),
    Char(char),
}

fn piece_strategy() -> impl Strategy<Value = Piece> {
    prop_oneof![
        (0u8..10).prop_map(Piece::Token),
        proptest::char::range('a', 'z').prop_map(Piece::Char),
        proptest::char::range('0', '9').prop_map(Piece::Char),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig { cases: CASES, .. ProptestConfig::default() })]

    #[test]
    fn neighbors_are_symmetric_and_irreflexive(rects in rects_strategy()) {
        let fs = features(&rects);
        for predicate in [AdjacencyPredicate::TouchesOrIntersects, AdjacencyPredicate::Touches] {
            let n = build_neighbors(&fs, &AdjacencyOptions { predicate, strategy: CandidateStrategy::Exhaustive });
            prop_assert_eq!(n.len(), fs.len());
            for (a, list) in &n {
                prop_assert!(!list.contains(a), "{} lists itself", a);
                prop_assert!(list.windows(2).all(|w| w[0] < w[1]), "list of {} not ascending", a);
                for b in list {
                    prop_assert!(n[b].contains(a), "{} -> {} not mirrored", a, b);
                }
            }
        }
    }

    #[test]
    fn index_never_changes_neighbors(rects in rects_strategy()) {
        let fs = features(&rects);
        for predicate in [AdjacencyPredicate::TouchesOrIntersects, AdjacencyPredicate::Touches] {
            let ex = build_neighbors(&fs, &AdjacencyOptions { predicate, strategy: CandidateStrategy::Exhaustive });
            let ix = build_neighbors(&fs, &AdjacencyOptions { predicate, strategy: CandidateStrategy::Indexed });
            prop_assert_eq!(ex, ix);
        }
    }

    #[test]
    fn touches_is_subset_of_loose_predicate(rects in rects_strategy()) {
        let fs = features(&rects);
        let loose = build_neighbors(&fs, &AdjacencyOptions::default());
        let strict = build_neighbors(&fs, &AdjacencyOptions { predicate: AdjacencyPredicate::Touches, ..Default::default() });
        for (a, list) in &strict {
            for b in list {
                prop_assert!(loose[a].contains(b));
            }
        }
    }

    #[test]
    fn dissolve_is_order_independent(
        (original, shuffled) in rects_strategy().prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
    ) {
        let layer = |rs: &[(u8, u8, u8, u8)]| -> Vec<RawFeature> {
            rs.iter()
                .enumerate()
                .map(|(i, &(x, y, w, h))| RawFeature::new(i.to_string(), rect_mp(x, y, w, h)).with_parent("R"))
                .collect()
        };
        let a = dissolve(&layer(&original), &DissolveOptions::default());
        let b = dissolve(&layer(&shuffled), &DissolveOptions::default());
        let (ga, gb) = (&a.aggregates[0].geometry, &b.aggregates[0].geometry);
        prop_assert_eq!(a.aggregates[0].child_count, original.len());
        prop_assert!((ga.unsigned_area() - gb.unsigned_area()).abs() < 1e-6);
        prop_assert!(ga.xor(gb).unsigned_area() < 1e-6);
    }

    #[test]
    fn simplified_boundary_stays_within_tolerance(
        radii in prop::collection::vec(5.0f64..10.0, 8..60),
        tolerance in 0.01f64..2.0,
    ) {
        let original = star(&radii);
        let mut stats = SimplifyStats::default();
        let simplified = simplify(&original, tolerance, &mut stats);
        prop_assert!(stats.vertices_after <= stats.vertices_before);
        prop_assert!(max_deviation(&original, &simplified, 8) <= tolerance + 1e-9);
        let again = simplify(&original, tolerance, &mut SimplifyStats::default());
        prop_assert_eq!(simplified, again);
    }

    #[test]
    fn repair_is_idempotent(pts in prop::collection::vec((0i8..10, 0i8..10), 3..7)) {
        let mut coords: Vec<Coord<f64>> = pts.iter().map(|&(x, y)| Coord { x: x as f64, y: y as f64 }).collect();
        coords.push(coords[0]);
        let mp = MultiPolygon::new(vec![Polygon::new(LineString::new(coords), Vec::new())]);
        if let Ok(once) = repair(&mp) {
            let twice = repair(&once);
            prop_assert!(twice.is_ok());
            let twice = twice.unwrap();
            prop_assert!((once.unsigned_area() - twice.unsigned_area()).abs() < 1e-6);
            prop_assert!(once.xor(&twice).unsigned_area() < 1e-6);
        }
    }

    #[test]
    fn decoded_text_has_no_tokens(pieces in prop::collection::vec(piece_strategy(), 0..12)) {
        let table = EscapeTable::default();
        let tokens: Vec<(String, char)> = table.tokens().map(|(t, d)| (t.to_string(), d)).collect();
        let mut raw = String::new();
        let mut digits_only = true;
        for p in &pieces {
            match p {
                Piece::Token(i) => raw.push_str(&tokens[*i as usize].0),
                Piece::Char(c) => {
                    raw.push(*c);
                    digits_only &= c.is_ascii_digit();
                }
            }
        }
        let decoder = Decoder::default();
        let text = decoder.decode_text(&raw);
        prop_assert!(!text.contains('_'), "token left in {:?}", text);
        prop_assert_eq!(text.chars().count(), pieces.len());
        if digits_only && !pieces.is_empty() {
            prop_assert!(matches!(decoder.decode(&raw), Code::Numeric(_)));
        }
    }
}
