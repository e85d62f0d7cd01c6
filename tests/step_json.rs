//! The step list is the crate's output format; its JSON shape is part of
//! the contract.

use pretty_assertions::assert_eq;

use chemcompiler::compile;
use chemcompiler::ir::Step;

#[test]
fn steps_serialize_with_op_tags() {
    let steps = compile("Water (20 mL) was added. The mixture was filtered.").unwrap();
    let json = serde_json::to_value(&steps).unwrap();
    let ops: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["op"].as_str().unwrap())
        .collect();
    assert_eq!(ops, vec!["add", "filter"]);
    assert_eq!(json[0]["vessel"], "filter");
    assert_eq!(json[1]["filter_vessel"], "filter");
}

#[test]
fn step_list_round_trips_through_json() {
    let steps = compile(
        "Sodium hydroxide (5 g) was added to the reaction vessel. \
         The mixture was extracted with diethyl ether (50 mL). \
         The mixture was filtered.",
    )
    .unwrap();
    let json = serde_json::to_string(&steps).unwrap();
    let back: Vec<Step> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, steps);
}
