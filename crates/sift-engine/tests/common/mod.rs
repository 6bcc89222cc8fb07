#![allow(dead_code)]

use std::sync::Arc;

use bson::{Bson, Document, doc};
use sift_engine::{Query, parse_query};

/// Three users with ages, tags, addresses and posts.
pub fn users() -> Vec<Document> {
    vec![
        doc! {
            "name": "Alice",
            "age": 25,
            "tags": ["dev"],
            "address": { "city": "Austin", "country": "US" },
            "posts": [
                { "title": "Hello", "likes": 5, "comments": [{ "by": "Bob" }] },
                { "title": "Rust", "likes": 12, "comments": [] }
            ]
        },
        doc! {
            "name": "Bob",
            "age": 17,
            "tags": ["test"],
            "address": { "city": "Berlin", "country": "DE" },
            "posts": []
        },
        doc! {
            "name": "Charlie",
            "age": 30,
            "tags": ["dev", "blog"],
            "address": { "city": "Austin", "country": "US" },
            "posts": [
                { "title": "Blogging", "likes": 3, "comments": [{ "by": "Alice" }, { "by": "Bob" }] }
            ]
        },
    ]
}

/// Parse a bson query document.
pub fn q(filter: Document) -> Arc<Query> {
    Arc::new(parse_query(&filter).unwrap())
}

pub fn names(results: &[Bson]) -> Vec<String> {
    results
        .iter()
        .map(|b| {
            b.as_document()
                .and_then(|d| d.get_str("name").ok())
                .unwrap_or("<none>")
                .to_string()
        })
        .collect()
}

pub fn doc_names(results: &[&Document]) -> Vec<String> {
    results
        .iter()
        .map(|d| d.get_str("name").unwrap_or("<none>").to_string())
        .collect()
}
