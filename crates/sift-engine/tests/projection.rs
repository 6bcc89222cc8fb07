mod common;
use common::*;

use bson::{Bson, bson, doc};
use sift_engine::{FindOptions, Template, find, parse_projection};

fn project(opts: &FindOptions) -> Vec<Bson> {
    let docs = users();
    find(&docs, &q(doc! { "name": "Alice" }), opts).unwrap()
}

// ── Field list ──────────────────────────────────────────────────

#[test]
fn field_list_keeps_only_requested_leaves() {
    let docs = vec![doc! { "address": { "city": "X", "country": "Y" } }];
    let opts = FindOptions::new().select_fields(["address.city"]);
    let out = find(&docs, &q(doc! {}), &opts).unwrap();
    assert_eq!(out, vec![bson!({ "address": { "city": "X" } })]);
}

#[test]
fn field_list_parent_wins_over_child() {
    let out = project(&FindOptions::new().select_fields(["address.city", "address"]));
    assert_eq!(
        out,
        vec![bson!({ "address": { "city": "Austin", "country": "US" } })]
    );
}

#[test]
fn field_list_omits_absent_values() {
    let out = project(&FindOptions::new().select_fields(["name", "nickname"]));
    assert_eq!(out, vec![bson!({ "name": "Alice" })]);
}

#[test]
fn empty_field_list_passes_through() {
    let docs = users();
    let out = find(
        &docs,
        &q(doc! { "name": "Bob" }),
        &FindOptions::new().select_fields(Vec::<String>::new()),
    )
    .unwrap();
    assert_eq!(out, vec![Bson::Document(docs[1].clone())]);
}

// ── Template ────────────────────────────────────────────────────

#[test]
fn template_array_pair() {
    let docs = vec![doc! { "posts": [{ "title": "t", "likes": 5 }] }];
    let projection = parse_projection(&bson!({ "posts": ["posts", { "t": "title" }] })).unwrap();
    let opts = FindOptions {
        projection: Some(projection),
        ..Default::default()
    };
    let out = find(&docs, &q(doc! {}), &opts).unwrap();
    assert_eq!(out, vec![bson!({ "posts": [{ "t": "t" }] })]);
}

#[test]
fn template_nested_arrays_and_constants() {
    let template = Template::object([
        ("who", Template::path("name")),
        ("version", Template::Const(Bson::Int32(2))),
        (
            "posts",
            Template::array(
                "posts",
                Template::object([
                    ("title", Template::path("title")),
                    (
                        "by",
                        Template::array(
                            "comments",
                            Template::object([("n", Template::path("by"))]),
                        ),
                    ),
                ]),
            ),
        ),
    ]);
    let out = project(&FindOptions::new().select_template(template));
    assert_eq!(
        out,
        vec![bson!({
            "who": "Alice",
            "version": 2,
            "posts": [
                { "title": "Hello", "by": [{ "n": "Bob" }] },
                { "title": "Rust", "by": [] }
            ]
        })]
    );
}

#[test]
fn template_from_bson_treats_other_values_as_constants() {
    let projection = parse_projection(&bson!({
        "n": "name",
        "flag": true,
        "nothing": null,
        "pair": ["tags", "not-a-template"]
    }))
    .unwrap();
    let opts = FindOptions {
        projection: Some(projection),
        ..Default::default()
    };
    let out = project(&opts);
    assert_eq!(
        out,
        vec![bson!({
            "n": "Alice",
            "flag": true,
            "nothing": null,
            "pair": ["tags", "not-a-template"]
        })]
    );
}

#[test]
fn template_array_over_missing_path_is_empty() {
    let template = Template::object([(
        "items",
        Template::array("nope", Template::object([("x", Template::path("x"))])),
    )]);
    let out = project(&FindOptions::new().select_template(template));
    assert_eq!(out, vec![bson!({ "items": [] })]);
}

// ── Transform ───────────────────────────────────────────────────

#[test]
fn transform_result_is_used_as_is() {
    let opts = FindOptions::new().select_with(|doc| {
        Bson::String(format!(
            "{}:{}",
            doc.get_str("name").unwrap_or("?"),
            doc.get_i32("age").unwrap_or(0)
        ))
    });
    let docs = users();
    let out = find(&docs, &q(doc! { "age": { "$gte": 18 } }), &opts).unwrap();
    assert_eq!(
        out,
        vec![Bson::String("Alice:25".into()), Bson::String("Charlie:30".into())]
    );
}

#[test]
fn projection_never_mutates_source() {
    let docs = users();
    let before = docs.clone();
    let opts = FindOptions::new().select_fields(["address.city"]);
    find(&docs, &q(doc! {}), &opts).unwrap();
    assert_eq!(docs, before);
}
