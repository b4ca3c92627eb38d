use ai_readiness::report::{render_csv, render_dashboard};
use ai_readiness::scoring::{pillar_score, round_score};
use ai_readiness::{Catalog, MaturityLevel, Rating, Report, Scores, Session};

fn rating(v: u8) -> Rating {
    Rating::new(v).unwrap()
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9
}

/// Every rating vector of length `n` over 0..=4.
fn all_vectors(n: usize) -> Vec<Vec<Rating>> {
    let mut out = vec![Vec::new()];
    for _ in 0..n {
        out = out
            .into_iter()
            .flat_map(|prefix| {
                (0..=4u8).map(move |v| {
                    let mut next = prefix.clone();
                    next.push(rating(v));
                    next
                })
            })
            .collect();
    }
    out
}

fn scores_for(catalog: &Catalog, fill: impl Fn(&str, usize) -> u8) -> Scores {
    let mut session = Session::new(catalog);
    for pillar in catalog.pillars() {
        for q in &pillar.questions {
            session
                .rate(&pillar.name, q.ordinal, rating(fill(&pillar.name, q.ordinal)))
                .unwrap();
        }
    }
    Scores::from_ratings(&session.collect()).unwrap()
}

#[test]
fn pillar_score_stays_in_range_for_every_five_question_vector() {
    for ratings in all_vectors(5) {
        let score = pillar_score(&ratings).unwrap();
        assert!((0.0..=4.0).contains(&score), "{ratings:?} -> {score}");

        let sum: u32 = ratings.iter().map(|r| u32::from(r.value())).sum();
        assert!(approx_eq(score, f64::from(sum) / 5.0));
    }
}

#[test]
fn every_reachable_score_gets_exactly_one_level() {
    for ratings in all_vectors(5).into_iter().chain(all_vectors(7)) {
        let score = pillar_score(&ratings).unwrap();
        let level = MaturityLevel::from_score(score);
        let shown = round_score(score);
        let expected = if score == 0.0 {
            MaturityLevel::NotStarted
        } else if shown < 2.0 {
            MaturityLevel::Pilot
        } else if shown < 3.0 {
            MaturityLevel::Operational
        } else if shown < 4.0 {
            MaturityLevel::Industrialized
        } else {
            MaturityLevel::Optimized
        };
        assert_eq!(level, expected, "score {score}");
    }
}

#[test]
fn all_zero_is_not_started_everywhere() {
    let catalog = Catalog::builtin();
    let scores = scores_for(&catalog, |_, _| 0);

    assert_eq!(scores.pillars.len(), 6);
    for p in &scores.pillars {
        assert_eq!(p.score, 0.0);
        assert_eq!(p.level, MaturityLevel::NotStarted);
    }
    assert_eq!(scores.overall, 0.0);
    assert_eq!(scores.overall_level, MaturityLevel::NotStarted);
}

#[test]
fn all_four_is_optimized_everywhere() {
    let catalog = Catalog::builtin();
    let scores = scores_for(&catalog, |_, _| 4);

    for p in &scores.pillars {
        assert_eq!(p.score, 4.0);
        assert_eq!(p.level, MaturityLevel::Optimized);
    }
    assert_eq!(scores.overall, 4.0);
    assert_eq!(scores.overall_level, MaturityLevel::Optimized);
}

#[test]
fn overall_is_unweighted_mean_of_pillar_means() {
    let catalog = Catalog::builtin();
    // Five-question pillars get 1s, the seven-question pillar gets 4s.
    let scores = scores_for(&catalog, |pillar, _| {
        if catalog.pillar(pillar).unwrap().len() == 7 {
            4
        } else {
            1
        }
    });

    let mean: f64 =
        scores.pillars.iter().map(|p| p.score).sum::<f64>() / scores.pillars.len() as f64;
    assert!(approx_eq(scores.overall, mean));
    assert!(approx_eq(scores.overall, 1.5));

    // Flat mean over all 32 answers would be (25 + 28) / 32.
    assert!(!approx_eq(scores.overall, 53.0 / 32.0));
}

#[test]
fn two_pillar_assessment_scores_and_exports() {
    let catalog = Catalog::from_json(
        r#"{"pillars": [
            {"name": "Infrastructure", "questions": ["a", "b", "c", "d", "e"]},
            {"name": "Orchestration", "questions": ["a", "b", "c", "d", "e"]}
        ]}"#,
    )
    .unwrap();

    let mut session = Session::new(&catalog);
    for (ordinal, v) in [0u8, 1, 2, 1, 0].into_iter().enumerate() {
        session.rate("Infrastructure", ordinal + 1, rating(v)).unwrap();
    }
    for ordinal in 1..=5 {
        session.rate("Orchestration", ordinal, Rating::MAX).unwrap();
    }

    let scores = Scores::from_ratings(&session.collect()).unwrap();
    assert!(approx_eq(scores.pillars[0].score, 0.8));
    assert_eq!(scores.pillars[0].level, MaturityLevel::Pilot);
    assert!(approx_eq(scores.pillars[1].score, 4.0));
    assert_eq!(scores.pillars[1].level, MaturityLevel::Optimized);
    assert!(approx_eq(scores.overall, 2.4));
    assert_eq!(scores.overall_level, MaturityLevel::Operational);

    let report = Report::from_scores(&scores);
    let csv = render_csv(&report);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Pillar,Average Score,Maturity Level",
            "Infrastructure,0.80,Pilot",
            "Orchestration,4.00,Optimized",
            "Overall,2.40,Operational",
        ]
    );

    let dashboard = render_dashboard(&report);
    assert!(dashboard.contains("Infrastructure: 0.80 → Pilot"));
    assert!(dashboard.contains("Overall Maturity Score: 2.40"));
    assert!(dashboard.contains("Overall Maturity Level: Operational"));
}

#[test]
fn csv_has_one_row_per_pillar_plus_overall() {
    let catalog = Catalog::builtin();
    let scores = scores_for(&catalog, |_, ordinal| (ordinal % 5) as u8);
    let csv = render_csv(&Report::from_scores(&scores));

    let rows: Vec<&str> = csv.lines().skip(1).collect();
    assert_eq!(rows.len(), catalog.pillars().len() + 1);
    for row in rows {
        let score = row.rsplit(',').nth(1).unwrap();
        let (_, decimals) = score.split_once('.').unwrap();
        assert_eq!(decimals.len(), 2, "{row}");
    }
}

#[test]
fn overall_just_under_two_is_reported_consistently() {
    let catalog = Catalog::builtin();
    // Five-question pillars sum to 42 (20 + 20 + 2), governance sums to 25:
    // overall = (42/5 + 25/7) / 6 = 419/210 ≈ 1.9952.
    let answers: [&[u8]; 6] = [
        &[4, 4, 4, 4, 4],
        &[4, 4, 4, 4, 4],
        &[2, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0],
        &[4, 4, 4, 4, 4, 4, 1],
    ];
    let mut session = Session::new(&catalog);
    for (pillar, values) in catalog.pillars().iter().zip(answers) {
        for (idx, v) in values.iter().enumerate() {
            session.rate(&pillar.name, idx + 1, rating(*v)).unwrap();
        }
    }

    let scores = Scores::from_ratings(&session.collect()).unwrap();
    assert!(approx_eq(scores.overall, 419.0 / 210.0));
    assert!(scores.overall < 2.0);
    assert_eq!(scores.overall_level, MaturityLevel::Operational);

    let report = Report::from_scores(&scores);
    let csv = render_csv(&report);
    assert_eq!(csv.lines().last(), Some("Overall,2.00,Operational"));
    assert!(!csv.contains("2.00,Pilot"));

    let dashboard = render_dashboard(&report);
    assert!(dashboard.contains("Overall Maturity Score: 2.00"));
    assert!(dashboard.contains("Overall Maturity Level: Operational"));
}

#[test]
fn reported_score_always_matches_its_level() {
    for n in 0..=840u32 {
        let score = f64::from(n) / 210.0;
        let shown: f64 = format!("{:.2}", round_score(score)).parse().unwrap();
        let level = MaturityLevel::from_score(score);
        if score == 0.0 {
            assert_eq!(level, MaturityLevel::NotStarted);
            continue;
        }
        let expected = match shown {
            s if s <= 1.99 => MaturityLevel::Pilot,
            s if s <= 2.99 => MaturityLevel::Operational,
            s if s <= 3.99 => MaturityLevel::Industrialized,
            _ => MaturityLevel::Optimized,
        };
        assert_eq!(level, expected, "{score} shown as {shown:.2}");
    }
}
