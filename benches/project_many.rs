//! This bench test projects a large request collection through the department
//! views and reduces it into dashboard statistics.

#![allow(missing_docs)]

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use request_desk::{
    Dashboard, Employee, NewRequest, RequestData, RequestStore, RequestType,
    domain::{
        project,
        view::{AllRequestsView, InterviewView, LoanView},
    },
};
use serde_json::json;

/// Generates a mixed collection with a third of the requests decided.
fn preseed_store(size: usize) -> RequestStore {
    let mut store = RequestStore::with_capacity(size);
    for i in 0..size {
        let (request_type, data) = match i % 4 {
            0 => (RequestType::Loan, json!({ "amount": i * 1000, "tenure": 12 })),
            1 => (RequestType::Asset, json!({ "assetType": "Laptop", "quantity": 1 })),
            2 => (
                RequestType::Interview,
                json!({ "candidateName": format!("Candidate {i}"), "interviewers": ["A", "B"] }),
            ),
            _ => (RequestType::Grievance, json!({ "subject": "Parking" })),
        };
        let id = store
            .add(NewRequest::new(
                Employee::new(format!("Employee {i}"), format!("EMP-{i:05}"), "Operations"),
                RequestData::from_parts(request_type, data),
            ))
            .id();
        if i % 3 == 0 {
            store.approve(id).unwrap();
        }
    }
    store
}

fn project_views(c: &mut Criterion) {
    let store = preseed_store(10_000);

    c.bench_function("project loan view", |b| {
        b.iter(|| project::<LoanView>(store.requests()).stats());
    });

    c.bench_function("search all requests", |b| {
        b.iter(|| project::<AllRequestsView>(store.requests()).search("employee 99").len());
    });

    c.bench_function("compute dashboard", |b| {
        b.iter(|| Dashboard::compute(store.requests()));
    });

    c.bench_function("complete interviews", |b| {
        b.iter_batched(
            || store.clone(),
            |mut store| {
                let ids: Vec<_> = project::<InterviewView>(store.requests())
                    .pending()
                    .map(|row| row.id)
                    .collect();
                for id in ids {
                    store
                        .apply(request_desk::Action::complete(id))
                        .unwrap();
                }
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, project_views);
criterion_main!(benches);
