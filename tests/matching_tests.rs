use bigdecimal::BigDecimal;
use freight_quote_matcher::service::similarity::{location_similarity, numeric_similarity, string_similarity, weight_similarity, Place};
use freight_quote_matcher::service::{Attribute, WeightTable};
use freight_quote_matcher::{find_matches, MatchOptions, QuoteRecord};
use std::str::FromStr;

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

fn savannah_query() -> QuoteRecord {
    QuoteRecord {
        id: 1,
        origin_city: Some("Savannah".into()),
        origin_state_province: Some("GA".into()),
        origin_country: Some("USA".into()),
        destination_city: Some("Chicago".into()),
        destination_state_province: Some("IL".into()),
        destination_country: Some("USA".into()),
        service_type: Some("Drayage".into()),
        cargo_weight: Some(dec("65000")),
        weight_unit: Some("lbs".into()),
        ..QuoteRecord::default()
    }
}

fn near_identical() -> QuoteRecord {
    QuoteRecord {
        id: 2,
        cargo_weight: Some(dec("64000")),
        final_agreed_price: Some(dec("2200")),
        ..savannah_query()
    }
}

fn unrelated() -> QuoteRecord {
    QuoteRecord {
        id: 3,
        origin_city: Some("Seattle".into()),
        origin_state_province: Some("WA".into()),
        origin_country: Some("USA".into()),
        destination_city: Some("Miami".into()),
        destination_state_province: Some("FL".into()),
        destination_country: Some("USA".into()),
        service_type: Some("Ocean".into()),
        cargo_weight: Some(dec("5000")),
        weight_unit: Some("kg".into()),
        initial_quote_amount: Some(dec("4100")),
        ..QuoteRecord::default()
    }
}

/// 固定种子的伪随机语料
fn corpus(size: usize) -> Vec<QuoteRecord> {
    let cities = ["Savannah", "Chicago", "Seattle", "Miami", "Houston", "Newark", ""];
    let states = [Some("GA"), Some("IL"), None, Some("TX")];
    let services = [Some("Drayage"), Some("Ocean"), Some("Ground"), Some("Intermodal"), None];
    let units = [Some("kg"), Some("lbs"), Some("tons"), None];
    let cargo = [
        Some("frozen poultry on pallets"),
        Some("steel coils"),
        Some("EV batteries, hazmat class 9"),
        None,
    ];

    let mut seed: u64 = 0x5eed;
    let mut next = move |n: usize| {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((seed >> 33) as usize) % n
    };

    (0..size)
        .map(|i| QuoteRecord {
            id: i as i64 + 1,
            origin_city: Some(cities[next(cities.len())].to_string()),
            origin_state_province: states[next(states.len())].map(String::from),
            origin_country: Some("USA".into()),
            destination_city: Some(cities[next(cities.len())].to_string()),
            destination_country: if next(3) == 0 { None } else { Some("USA".into()) },
            cargo_description: cargo[next(cargo.len())].map(String::from),
            cargo_weight: Some(BigDecimal::from((next(50) * 1000) as i64)),
            weight_unit: units[next(units.len())].map(String::from),
            cargo_length: if next(2) == 0 { Some(BigDecimal::from(next(40) as i64)) } else { None },
            cargo_width: Some(BigDecimal::from(next(10) as i64 + 1)),
            piece_count: if next(4) == 0 { None } else { Some(next(30) as i32) },
            is_hazmat: [None, Some(true), Some(false)][next(3)],
            service_type: services[next(services.len())].map(String::from),
            initial_quote_amount: if next(2) == 0 { Some(BigDecimal::from(next(5000) as i64)) } else { None },
            final_agreed_price: if next(3) == 0 { Some(BigDecimal::from(next(5000) as i64)) } else { None },
            ..QuoteRecord::default()
        })
        .collect()
}

#[test]
fn savannah_to_chicago_end_to_end() {
    let query = savannah_query();
    let candidates = vec![near_identical(), unrelated()];
    let matches = find_matches(&query, &candidates, &MatchOptions::default());

    assert_eq!(matches.len(), 1);
    let m = &matches[0];
    assert_eq!(m.source_quote_id, 1);
    assert_eq!(m.matched_quote_id, 2);
    assert_eq!(m.suggested_price, Some(2200.0));
    // 双方都没有货物描述/尺寸/件数，这三项得 0
    assert_eq!(m.similarity_score, 0.6923);
    assert_eq!(m.price_confidence, Some(0.7923));
    assert_eq!(m.breakdown["origin"], 1.0);
    assert_eq!(m.breakdown["destination"], 1.0);
    assert_eq!(m.breakdown["weight"], 0.9487);
    assert_eq!(m.breakdown["cargo_type"], 0.0);
    assert_eq!(m.breakdown["hazmat"], 1.0);
}

#[test]
fn shared_cargo_description_lifts_score_above_point_seven() {
    let query = QuoteRecord {
        cargo_description: Some("Frozen poultry, 20 pallets".into()),
        ..savannah_query()
    };
    let candidate = QuoteRecord {
        cargo_description: Some("frozen poultry pallets".into()),
        ..near_identical()
    };
    let matches = find_matches(&query, &[candidate, unrelated()], &MatchOptions::default());
    assert_eq!(matches.len(), 1);
    assert!(matches[0].similarity_score > 0.7, "{}", matches[0].similarity_score);
}

#[test]
fn query_is_excluded_from_its_own_matches() {
    let pool = corpus(200);
    let options = MatchOptions {
        min_score: 0.0,
        max_matches: usize::MAX,
        ..MatchOptions::default()
    };
    for query in pool.iter().take(20) {
        let matches = find_matches(query, &pool, &options);
        assert_eq!(matches.len(), pool.len() - 1);
        assert!(matches.iter().all(|m| m.matched_quote_id != query.id));
    }
}

#[test]
fn scores_bounded_sorted_thresholded_and_truncated() {
    let pool = corpus(300);
    for (min_score, max_matches) in [(0.0, 5), (0.3, 25), (0.5, 10), (0.9, 3)] {
        let options = MatchOptions {
            min_score,
            max_matches,
            ..MatchOptions::default()
        };
        for query in pool.iter().step_by(37) {
            let matches = find_matches(query, &pool, &options);
            assert!(matches.len() <= max_matches);
            for m in &matches {
                assert!((0.0..=1.0).contains(&m.similarity_score));
                assert!(m.similarity_score >= min_score);
                assert!(m.breakdown.values().all(|v| (0.0..=1.0).contains(v)));
                if let Some(c) = m.price_confidence {
                    assert!((0.0..=1.0).contains(&c));
                    assert!(m.suggested_price.is_some());
                }
            }
            assert!(matches
                .windows(2)
                .all(|w| w[0].similarity_score >= w[1].similarity_score));
        }
    }
}

#[test]
fn string_similarity_symmetry_and_identity() {
    let words = ["Savannah", "savanna", "Chicago", "GA", "Los Angeles", "Ocean", "x"];
    for a in words {
        assert_eq!(string_similarity(Some(a), Some(a)), 1.0);
        for b in words {
            assert_eq!(string_similarity(Some(a), Some(b)), string_similarity(Some(b), Some(a)));
        }
    }
}

#[test]
fn numeric_identity_for_any_tolerance() {
    for x in [0.0, 1.0, -3.5, 65000.0, 1e-9] {
        for tol in [0.2, 0.3, 0.4, 1.0] {
            assert_eq!(numeric_similarity(Some(x), Some(x), tol), 1.0);
        }
    }
}

#[test]
fn absent_city_does_not_dilute_location() {
    let a = Place { city: None, state: None, country: Some("USA") };
    let b = Place { city: None, state: None, country: Some("USA") };
    assert_eq!(location_similarity(&a, &b), 1.0);
}

#[test]
fn pounds_and_kilograms_compare_equal() {
    let s = weight_similarity(Some(&dec("1000")), Some("lbs"), Some(&dec("453.592")), Some("kg"));
    assert!((s - 1.0).abs() < 1e-4);
}

#[test]
fn final_price_beats_initial_and_adds_bonus() {
    let query = savannah_query();
    let both = QuoteRecord {
        final_agreed_price: Some(dec("900")),
        initial_quote_amount: Some(dec("1200")),
        ..near_identical()
    };
    let initial_only = QuoteRecord {
        final_agreed_price: None,
        initial_quote_amount: Some(dec("1200")),
        ..near_identical()
    };

    let with_final = &find_matches(&query, &[both], &MatchOptions::default())[0];
    let without = &find_matches(&query, &[initial_only], &MatchOptions::default())[0];

    assert_eq!(with_final.suggested_price, Some(900.0));
    assert_eq!(without.suggested_price, Some(1200.0));
    let diff = with_final.price_confidence.unwrap() - without.price_confidence.unwrap();
    assert!((diff - 0.1).abs() < 1e-9);
}

#[test]
fn empty_weight_table_scores_everything_zero() {
    let options = MatchOptions {
        min_score: 0.0,
        weights: WeightTable::empty(),
        ..MatchOptions::default()
    };
    let matches = find_matches(&savannah_query(), &[near_identical()], &options);
    assert_eq!(matches[0].similarity_score, 0.0);
    assert_eq!(matches[0].price_confidence, Some(0.1));
}

#[test]
fn reduced_weight_table_only_counts_listed_attributes() {
    let options = MatchOptions {
        weights: WeightTable::default()
            .without(Attribute::CargoType)
            .without(Attribute::Dimensions)
            .without(Attribute::Pieces),
        ..MatchOptions::default()
    };
    let matches = find_matches(&savannah_query(), &[near_identical()], &options);
    // (0.2 + 0.2 + 0.15 * 0.9487 + 0.1 + 0.05) / 0.7
    assert_eq!(matches[0].similarity_score, 0.989);
}

#[test]
fn pieces_and_dimensions_breakdown_reflect_tolerance_bands() {
    let query = QuoteRecord {
        piece_count: Some(10),
        cargo_length: Some(dec("2")),
        cargo_width: Some(dec("3")),
        cargo_height: Some(dec("4")),
        ..savannah_query()
    };
    let candidate = QuoteRecord {
        piece_count: Some(9),
        cargo_length: Some(dec("2")),
        cargo_width: Some(dec("2")),
        cargo_height: Some(dec("5")),
        ..near_identical()
    };
    let options = MatchOptions {
        min_score: 0.0,
        ..MatchOptions::default()
    };

    let matches = find_matches(&query, &[candidate], &options);
    assert_eq!(matches.len(), 1);
    // 1 - 0.1 / 0.3
    assert_eq!(matches[0].breakdown["pieces"], 0.6667);
    // 体积 24 vs 20: 1 - (4 / 24) / 0.4
    assert_eq!(matches[0].breakdown["dimensions"], 0.5833);
}

#[test]
fn hazmat_given_as_text_still_scores() {
    let candidates: Vec<QuoteRecord> = serde_json::from_str(
        r#"[{"id": 2, "is_hazmat": "yes"}, {"id": 3, "is_hazmat": "unknown"}]"#,
    )
    .unwrap();
    let query = QuoteRecord {
        is_hazmat: Some(true),
        ..QuoteRecord::new(1)
    };
    let options = MatchOptions {
        min_score: 0.0,
        ..MatchOptions::default()
    };
    let matches = find_matches(&query, &candidates, &options);
    let hazmat: Vec<(i64, f64)> = matches
        .iter()
        .map(|m| (m.matched_quote_id, m.breakdown["hazmat"]))
        .collect();
    assert_eq!(hazmat, vec![(2, 1.0), (3, 0.0)]);
}
