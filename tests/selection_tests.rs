use crawler_studio::element::element_model::{SelectedElement, SelectorType};
use crawler_studio::selection::selection_set::{MatchMode, SelectionSet};

use crate::common::fixtures::{el, two_divs};

mod common;

// =========================================================================
// toggle
// =========================================================================

#[test]
fn toggle_adds_then_removes() {
    let mut set = SelectionSet::new();

    let items = set.toggle(SelectedElement::new("#a", SelectorType::Id, 1));
    assert_eq!(items.len(), 1);
    assert!(set.is_selected("#a", SelectorType::Id));

    let items = set.toggle(SelectedElement::new("#a", SelectorType::Id, 1));
    assert!(items.is_empty());
    assert!(!set.is_selected("#a", SelectorType::Id));
}

#[test]
fn double_toggle_restores_original_set() {
    let mut set = SelectionSet::new();
    set.toggle(SelectedElement::new(".x", SelectorType::Class, 2));
    set.toggle(SelectedElement::new("div", SelectorType::Tag, 2));
    let before = set.clone();

    set.toggle(SelectedElement::new("#a", SelectorType::Id, 1));
    set.toggle(SelectedElement::new("#a", SelectorType::Id, 1));
    assert_eq!(set, before);
}

#[test]
fn toggle_keys_on_selector_and_type() {
    let mut set = SelectionSet::new();
    set.toggle(SelectedElement::new("item", SelectorType::Tag, 1));
    set.toggle(SelectedElement::new(".item", SelectorType::Class, 1));
    assert_eq!(set.len(), 2, "same text, different type");

    // count is not part of the key
    set.toggle(SelectedElement::new(".item", SelectorType::Class, 99));
    assert_eq!(set.len(), 1);
    assert_eq!(set.items()[0].kind, SelectorType::Tag);
}

#[test]
fn remove_and_clear() {
    let mut set = SelectionSet::new();
    set.toggle(SelectedElement::from_selector("#a"));
    set.toggle(SelectedElement::from_selector(".x"));

    assert!(set.remove(".x", SelectorType::Class));
    assert!(!set.remove(".x", SelectorType::Class));
    assert_eq!(set.len(), 1);

    set.clear();
    assert!(set.is_empty());
}

#[test]
fn from_selector_infers_kind() {
    assert_eq!(SelectedElement::from_selector("#a").kind, SelectorType::Id);
    assert_eq!(SelectedElement::from_selector(".x").kind, SelectorType::Class);
    assert_eq!(SelectedElement::from_selector("div").kind, SelectorType::Tag);
}

// =========================================================================
// filtering
// =========================================================================

#[test]
fn filter_all_with_id_keeps_first_div() {
    let elements = two_divs();
    let mut set = SelectionSet::new();
    set.toggle(SelectedElement::from_selector("#a"));

    let hits = set.filter_all(&elements);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id.as_deref(), Some("a"));
}

#[test]
fn filter_any_with_class_keeps_second_div() {
    let elements = two_divs();
    let mut set = SelectionSet::new();
    set.toggle(SelectedElement::from_selector(".y"));

    let hits = set.filter_any(&elements);
    assert_eq!(hits.len(), 1);
    assert!(hits[0].has_class("y"));
    assert!(hits[0].id.is_none());
}

#[test]
fn filter_all_requires_every_selection() {
    let elements = two_divs();
    let mut set = SelectionSet::new();
    set.toggle(SelectedElement::from_selector(".x"));
    assert_eq!(set.filter(&elements, MatchMode::All).len(), 2);

    set.toggle(SelectedElement::from_selector(".y"));
    assert_eq!(set.filter(&elements, MatchMode::All).len(), 1);

    set.toggle(SelectedElement::from_selector("#a"));
    assert!(set.filter(&elements, MatchMode::All).is_empty());
}

#[test]
fn filter_any_accepts_one_match() {
    let elements = vec![
        el("div", Some("a"), &[]),
        el("span", None, &["y"]),
        el("p", None, &[]),
    ];
    let mut set = SelectionSet::new();
    set.toggle(SelectedElement::from_selector("#a"));
    set.toggle(SelectedElement::from_selector(".y"));

    let hits = set.filter(&elements, MatchMode::Any);
    let tags: Vec<&str> = hits.iter().map(|e| e.tag.as_str()).collect();
    assert_eq!(tags, vec!["div", "span"]);
}

#[test]
fn empty_selection_semantics() {
    let elements = two_divs();
    let set = SelectionSet::new();

    assert_eq!(set.filter_all(&elements).len(), 2, "AND over nothing keeps all");
    assert!(set.filter_any(&elements).is_empty(), "OR over nothing keeps none");
}

#[test]
fn tag_match_is_case_insensitive() {
    let elements = vec![el("DIV", None, &[])];
    let mut set = SelectionSet::new();
    set.toggle(SelectedElement::from_selector("div"));
    assert_eq!(set.filter_all(&elements).len(), 1);
}

#[test]
fn match_mode_parses_aliases() {
    assert_eq!("all".parse::<MatchMode>().unwrap(), MatchMode::All);
    assert_eq!("AND".parse::<MatchMode>().unwrap(), MatchMode::All);
    assert_eq!("or".parse::<MatchMode>().unwrap(), MatchMode::Any);
    assert!("xor".parse::<MatchMode>().is_err());
}
