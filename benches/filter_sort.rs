//! Benchmarks for the filter and sort pipeline.
//!
//! These benchmarks measure `filter_and_sort` over a generated todo set of
//! realistic size, with and without a search term.

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use todo_tui::filter::{filter_and_sort, CategoryFilter, Query, SortMode, StatusFilter};
use todo_tui::todo::{Category, Priority, Todo, TodoFields};

fn todos(count: u64) -> Vec<Todo> {
    let words = ["Køb mælk", "Ring til Åse", "Møde", "rapport", "Æbler", "tandlæge"];
    (1..=count)
        .map(|id| {
            let fields = TodoFields::new(format!("{} {}", words[id as usize % words.len()], id))
                .with_category(Category::ALL.get(id as usize % 4).copied())
                .with_priority(Priority::ALL[id as usize % 3])
                .with_deadline(NaiveDate::from_ymd_opt(2025, 1 + (id % 12) as u32, 1));
            let mut todo = Todo::new(id, fields);
            todo.done = id % 5 == 0;
            todo
        })
        .collect()
}

fn bench_sort_modes(c: &mut Criterion) {
    let todos = todos(1_000);
    let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
    for sort in SortMode::ALL {
        let query = Query {
            sort,
            ..Query::default()
        };
        c.bench_function(&format!("filter_and_sort_1000_{}", sort), |b| {
            b.iter(|| filter_and_sort(black_box(&todos), black_box(&query), today))
        });
    }
}

fn bench_search(c: &mut Criterion) {
    let todos = todos(1_000);
    let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
    let query = Query {
        category: CategoryFilter::Only(Category::Shopping),
        status: StatusFilter::Active,
        search: "MÆLK".to_string(),
        sort: SortMode::Alphabetical,
    };
    c.bench_function("filter_and_sort_1000_search", |b| {
        b.iter(|| filter_and_sort(black_box(&todos), black_box(&query), today))
    });
}

criterion_group!(benches, bench_sort_modes, bench_search);
criterion_main!(benches);
