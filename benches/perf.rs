use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use fpl_terminal::layout::Formation;
use fpl_terminal::squad_fetch::{build_squad_view, parse_squad_response};

fn bench_formation_positions(c: &mut Criterion) {
    let formations = [
        Formation::new(4, 4, 2),
        Formation::new(3, 5, 2),
        Formation::new(5, 4, 1),
    ];
    c.bench_function("formation_positions", |b| {
        b.iter(|| {
            for formation in formations {
                let spots = black_box(formation).positions();
                black_box(spots.len());
            }
        })
    });
}

fn bench_get_team_parse(c: &mut Criterion) {
    c.bench_function("get_team_parse", |b| {
        b.iter(|| {
            let resp = parse_squad_response(black_box(GET_TEAM_JSON)).unwrap();
            black_box(resp.team.len());
        })
    });
}

fn bench_squad_shape(c: &mut Criterion) {
    c.bench_function("squad_shape", |b| {
        b.iter(|| {
            let resp = parse_squad_response(black_box(GET_TEAM_JSON)).unwrap();
            let (squad, totals) = build_squad_view(resp).unwrap();
            black_box((squad.starters.len(), totals.total_cost));
        })
    });
}

criterion_group!(
    perf,
    bench_formation_positions,
    bench_get_team_parse,
    bench_squad_shape
);
criterion_main!(perf);

static GET_TEAM_JSON: &str = include_str!("../tests/fixtures/get_team.json");
