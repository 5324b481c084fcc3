//! Predefined grammars, emitted as surface text from the task's domain and
//! parsed through the ordinary code path.

use crate::search::{PerTag, Predicate, Task};
use std::fmt::Write;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[clap(rename_all = "kebab-case")]
pub enum GrammarPreset {
    /// The restricted feature space of Frances et al. (AAAI 2021):
    /// primitive and goal atoms, top/bot, negation, intersection,
    /// existential and value restriction, role inverse, counts and
    /// distances.
    FrancesEtAlAaai2021,
    /// Every constructor of the feature language.
    Complete,
}

fn predicates_with_arity<'a>(
    predicates: &'a PerTag<Vec<Predicate>>,
    arity: usize,
) -> impl Iterator<Item = &'a Predicate> {
    predicates
        .iter()
        .flat_map(|(_, list)| list.iter())
        .filter(move |predicate| predicate.arity == arity)
        // compiler-introduced predicates (e.g. the equality compilation)
        // are not part of the feature language surface
        .filter(|predicate| !predicate.name.starts_with('@'))
}

pub(crate) fn preset_text(preset: GrammarPreset, task: &Task) -> String {
    let mut out = String::new();
    out.push_str("[start_symbols]\n");
    out.push_str("    <concept_start> = <concept>\n");
    out.push_str("    <role_start> = <role>\n");
    out.push_str("    <boolean_start> = <boolean>\n");
    out.push_str("    <numerical_start> = <numerical>\n");
    out.push_str("[grammar_rules]\n");

    let mut rule = |head: &str, body: String, heads: &mut Vec<String>| {
        writeln!(out, "    <{head}> ::= {body}").expect("writing to a string cannot fail");
        if !heads.iter().any(|known| known == head) {
            heads.push(head.to_string());
        }
    };

    /* Concepts. */
    let mut concept_heads = vec![];
    rule("concept_bot", "@concept_bot".to_string(), &mut concept_heads);
    rule("concept_top", "@concept_top".to_string(), &mut concept_heads);
    for predicate in predicates_with_arity(&task.predicates, 1) {
        rule(
            "concept_atomic_state",
            format!("@concept_atomic_state {}", predicate.name),
            &mut concept_heads,
        );
        rule(
            "concept_atomic_goal",
            format!("@concept_atomic_goal \"{}\" true", predicate.name),
            &mut concept_heads,
        );
        rule(
            "concept_atomic_goal",
            format!("@concept_atomic_goal \"{}\" false", predicate.name),
            &mut concept_heads,
        );
    }
    rule(
        "concept_intersection",
        "@concept_intersection <concept> <concept>".to_string(),
        &mut concept_heads,
    );
    rule(
        "concept_negation",
        "@concept_negation <concept>".to_string(),
        &mut concept_heads,
    );
    rule(
        "concept_value_restriction",
        "@concept_value_restriction <role> <concept>".to_string(),
        &mut concept_heads,
    );
    rule(
        "concept_existential_quantification",
        "@concept_existential_quantification <role> <concept>".to_string(),
        &mut concept_heads,
    );
    if preset == GrammarPreset::Complete {
        rule(
            "concept_union",
            "@concept_union <concept> <concept>".to_string(),
            &mut concept_heads,
        );
        rule(
            "concept_role_value_map_containment",
            "@concept_role_value_map_containment <role> <role>".to_string(),
            &mut concept_heads,
        );
        rule(
            "concept_role_value_map_equality",
            "@concept_role_value_map_equality <role> <role>".to_string(),
            &mut concept_heads,
        );
        for object in &task.objects {
            rule(
                "concept_nominal",
                format!("@concept_nominal \"{}\"", object.name),
                &mut concept_heads,
            );
        }
    }

    /* Roles. */
    let mut role_heads = vec![];
    for predicate in predicates_with_arity(&task.predicates, 2) {
        rule(
            "role_atomic_state",
            format!("@role_atomic_state {}", predicate.name),
            &mut role_heads,
        );
        rule(
            "role_atomic_goal",
            format!("@role_atomic_goal \"{}\" true", predicate.name),
            &mut role_heads,
        );
    }
    rule(
        "role_inverse",
        "@role_inverse <role>".to_string(),
        &mut role_heads,
    );
    if preset == GrammarPreset::Complete {
        rule("role_universal", "@role_universal".to_string(), &mut role_heads);
        rule(
            "role_intersection",
            "@role_intersection <role> <role>".to_string(),
            &mut role_heads,
        );
        rule(
            "role_union",
            "@role_union <role> <role>".to_string(),
            &mut role_heads,
        );
        rule(
            "role_complement",
            "@role_complement <role>".to_string(),
            &mut role_heads,
        );
        rule(
            "role_composition",
            "@role_composition <role> <role>".to_string(),
            &mut role_heads,
        );
        rule(
            "role_transitive_closure",
            "@role_transitive_closure <role>".to_string(),
            &mut role_heads,
        );
        rule(
            "role_reflexive_transitive_closure",
            "@role_reflexive_transitive_closure <role>".to_string(),
            &mut role_heads,
        );
        rule(
            "role_restriction",
            "@role_restriction <role> <concept>".to_string(),
            &mut role_heads,
        );
        rule(
            "role_identity",
            "@role_identity <concept>".to_string(),
            &mut role_heads,
        );
    }

    /* Booleans. */
    let mut boolean_heads = vec![];
    for predicate in predicates_with_arity(&task.predicates, 0) {
        rule(
            "boolean_atomic_state",
            format!("@boolean_atomic_state {}", predicate.name),
            &mut boolean_heads,
        );
    }
    rule(
        "boolean_nonempty_concept",
        "@boolean_nonempty <concept>".to_string(),
        &mut boolean_heads,
    );
    rule(
        "boolean_nonempty_role",
        "@boolean_nonempty <role>".to_string(),
        &mut boolean_heads,
    );

    /* Numericals. */
    let mut numerical_heads = vec![];
    rule(
        "numerical_count_concept",
        "@numerical_count <concept>".to_string(),
        &mut numerical_heads,
    );
    rule(
        "numerical_count_role",
        "@numerical_count <role>".to_string(),
        &mut numerical_heads,
    );
    rule(
        "numerical_distance",
        "@numerical_distance <concept> <role> <concept>".to_string(),
        &mut numerical_heads,
    );

    /* Substitution rules into the per-tag pool non-terminals. */
    for head in concept_heads {
        writeln!(out, "    <concept> ::= <{head}>").expect("writing to a string cannot fail");
    }
    for head in role_heads {
        writeln!(out, "    <role> ::= <{head}>").expect("writing to a string cannot fail");
    }
    for head in boolean_heads {
        writeln!(out, "    <boolean> ::= <{head}>").expect("writing to a string cannot fail");
    }
    for head in numerical_heads {
        writeln!(out, "    <numerical> ::= <{head}>").expect("writing to a string cannot fail");
    }

    out
}
