//! nom parser for the grammar surface syntax:
//!
//! ```text
//! [start_symbols]
//!     <concept_start> = <concept>
//! [grammar_rules]
//!     <concept_x> ::= @concept_intersection <concept> <concept>
//!     <concept>   ::= <concept_x>
//! ```

use crate::dl::grammar::{
    BooleanBody, ConceptBody, DerivationRule, FeatureTag, Grammar, GrammarError, NumericalBody,
    RoleBody, SubstitutionRule,
};
use crate::parsers::{ignore_single_line_comment, ParseResult, Span};
use crate::search::{PredicateTag, Task};
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while1};
use nom::character::complete::{char, multispace0};
use nom::combinator::map;
use nom::multi::many0;
use nom::sequence::{delimited, preceded, tuple};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
enum RawArg {
    NonTerminal(String),
    Symbol(String),
    Quoted(String),
    True,
    False,
}

#[derive(Debug)]
enum RawBody {
    Derivation { keyword: String, args: Vec<RawArg> },
    Substitution(String),
}

#[derive(Debug)]
struct RawRule {
    head: String,
    body: RawBody,
}

#[derive(Debug)]
struct RawGrammar {
    starts: Vec<(String, String)>,
    rules: Vec<RawRule>,
}

fn whitespace<'a, F, O>(inner: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, O>
where
    F: FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    preceded(preceded(multispace0, ignore_single_line_comment), inner)
}

/// Same-line whitespace. Rule arguments must not spill onto the next line,
/// otherwise they would swallow the following rule's head.
fn inline_whitespace<'a, F, O>(inner: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, O>
where
    F: FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    preceded(take_while(|c: char| c == ' ' || c == '\t'), inner)
}

fn symbol(input: Span) -> ParseResult<String> {
    map(
        take_while1(|c: char| c.is_alphanumeric() || c == '-' || c == '_'),
        |span: Span| span.fragment().to_string(),
    )(input)
}

fn nonterminal(input: Span) -> ParseResult<String> {
    delimited(char('<'), symbol, char('>'))(input)
}

fn keyword(input: Span) -> ParseResult<String> {
    preceded(char('@'), symbol)(input)
}

fn quoted(input: Span) -> ParseResult<String> {
    delimited(char('"'), symbol, char('"'))(input)
}

fn argument(input: Span) -> ParseResult<RawArg> {
    alt((
        map(nonterminal, RawArg::NonTerminal),
        map(quoted, RawArg::Quoted),
        map(tag("true"), |_| RawArg::True),
        map(tag("false"), |_| RawArg::False),
        map(symbol, RawArg::Symbol),
    ))(input)
}

fn start_line(input: Span) -> ParseResult<(String, String)> {
    tuple((
        whitespace(nonterminal),
        preceded(whitespace(char('=')), whitespace(nonterminal)),
    ))(input)
}

fn rule_line(input: Span) -> ParseResult<RawRule> {
    map(
        tuple((
            whitespace(nonterminal),
            preceded(
                whitespace(tag("::=")),
                alt((
                    map(
                        tuple((whitespace(keyword), many0(inline_whitespace(argument)))),
                        |(keyword, args)| RawBody::Derivation { keyword, args },
                    ),
                    map(whitespace(nonterminal), RawBody::Substitution),
                )),
            ),
        )),
        |(head, body)| RawRule { head, body },
    )(input)
}

fn raw_grammar(input: Span) -> ParseResult<RawGrammar> {
    map(
        tuple((
            preceded(whitespace(tag("[start_symbols]")), many0(start_line)),
            preceded(whitespace(tag("[grammar_rules]")), many0(rule_line)),
            multispace0,
        )),
        |(starts, rules, _)| RawGrammar { starts, rules },
    )(input)
}

/// Per-tag non-terminal interner used during elaboration.
#[derive(Debug, Default)]
struct NonTerminals {
    names: Vec<String>,
    table: HashMap<String, u32>,
}

impl NonTerminals {
    fn intern(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.table.get(name) {
            return id;
        }
        let id = self.names.len() as u32;
        self.names.push(name.to_string());
        self.table.insert(name.to_string(), id);
        id
    }
}

struct Elaboration<'a> {
    task: &'a Task,
    concepts: NonTerminals,
    roles: NonTerminals,
    booleans: NonTerminals,
    numericals: NonTerminals,
    grammar: Grammar,
}

impl<'a> Elaboration<'a> {
    /// `boolean_nonempty` and `numerical_count` accept a concept or a role
    /// non-terminal; a name already interned as a role (or following the
    /// `role` naming convention) resolves as a role.
    fn is_role_nonterminal(&self, name: &str) -> bool {
        self.roles.table.contains_key(name)
            || (!self.concepts.table.contains_key(name) && name.starts_with("role"))
    }

    fn predicate(&self, name: &str, arity: usize) -> Result<(PredicateTag, usize), GrammarError> {
        let (tag, index) = self
            .task
            .find_predicate(name)
            .ok_or_else(|| GrammarError::UnknownPredicate(name.to_string()))?;
        if self.task.predicates.get(tag)[index].arity != arity {
            return Err(GrammarError::PredicateArity(name.to_string()));
        }
        Ok((tag, index))
    }

    fn symbol_arg<'b>(&self, args: &'b [RawArg], position: usize) -> Result<&'b str, GrammarError> {
        match args.get(position) {
            Some(RawArg::Symbol(name)) | Some(RawArg::Quoted(name)) => Ok(name),
            _ => Err(GrammarError::Parse(format!(
                "expected a name argument at position {position}"
            ))),
        }
    }

    fn nonterminal_arg(
        args: &[RawArg],
        position: usize,
        interner: &mut NonTerminals,
    ) -> Result<u32, GrammarError> {
        match args.get(position) {
            Some(RawArg::NonTerminal(name)) => Ok(interner.intern(name)),
            _ => Err(GrammarError::Parse(format!(
                "expected a nonterminal argument at position {position}"
            ))),
        }
    }

    fn polarity_arg(args: &[RawArg], position: usize) -> Result<bool, GrammarError> {
        match args.get(position) {
            // `true` selects the positive goal literals, `false` the
            // negated ones
            Some(RawArg::True) => Ok(false),
            Some(RawArg::False) => Ok(true),
            _ => Err(GrammarError::Parse(format!(
                "expected true/false at position {position}"
            ))),
        }
    }

    fn elaborate_rule(&mut self, rule: &RawRule) -> Result<(), GrammarError> {
        let RawBody::Derivation { keyword, args } = &rule.body else {
            return Ok(()); // substitution rules are resolved in a later pass
        };

        match keyword.as_str() {
            "concept_bot" | "concept_top" | "concept_atomic_state" | "concept_atomic_goal"
            | "concept_intersection" | "concept_union" | "concept_negation"
            | "concept_value_restriction" | "concept_existential_quantification"
            | "concept_role_value_map_containment" | "concept_role_value_map_equality"
            | "concept_nominal" => {
                let head = self.concepts.intern(&rule.head);
                let body = match keyword.as_str() {
                    "concept_bot" => ConceptBody::Bot,
                    "concept_top" => ConceptBody::Top,
                    "concept_atomic_state" => {
                        let (tag, index) = self.predicate(self.symbol_arg(args, 0)?, 1)?;
                        ConceptBody::AtomicState(tag, index)
                    }
                    "concept_atomic_goal" => {
                        let (tag, index) = self.predicate(self.symbol_arg(args, 0)?, 1)?;
                        ConceptBody::AtomicGoal(tag, index, Self::polarity_arg(args, 1)?)
                    }
                    "concept_intersection" | "concept_union" => {
                        let left = Self::nonterminal_arg(args, 0, &mut self.concepts)?;
                        let right = Self::nonterminal_arg(args, 1, &mut self.concepts)?;
                        if keyword == "concept_intersection" {
                            ConceptBody::Intersection(left, right)
                        } else {
                            ConceptBody::Union(left, right)
                        }
                    }
                    "concept_negation" => {
                        ConceptBody::Negation(Self::nonterminal_arg(args, 0, &mut self.concepts)?)
                    }
                    "concept_value_restriction" | "concept_existential_quantification" => {
                        let role = Self::nonterminal_arg(args, 0, &mut self.roles)?;
                        let concept = Self::nonterminal_arg(args, 1, &mut self.concepts)?;
                        if keyword == "concept_value_restriction" {
                            ConceptBody::ValueRestriction(role, concept)
                        } else {
                            ConceptBody::ExistentialQuantification(role, concept)
                        }
                    }
                    "concept_role_value_map_containment" | "concept_role_value_map_equality" => {
                        let left = Self::nonterminal_arg(args, 0, &mut self.roles)?;
                        let right = Self::nonterminal_arg(args, 1, &mut self.roles)?;
                        if keyword == "concept_role_value_map_containment" {
                            ConceptBody::RoleValueMapContainment(left, right)
                        } else {
                            ConceptBody::RoleValueMapEquality(left, right)
                        }
                    }
                    "concept_nominal" => {
                        let name = self.symbol_arg(args, 0)?;
                        let object = self
                            .task
                            .object_index(name)
                            .ok_or_else(|| GrammarError::UnknownObject(name.to_string()))?;
                        ConceptBody::Nominal(object)
                    }
                    _ => unreachable!(),
                };
                self.grammar
                    .concept_rules
                    .push(DerivationRule { head, body });
            }

            "role_universal" | "role_atomic_state" | "role_atomic_goal" | "role_intersection"
            | "role_union" | "role_complement" | "role_inverse" | "role_composition"
            | "role_transitive_closure" | "role_reflexive_transitive_closure"
            | "role_restriction" | "role_identity" => {
                let head = self.roles.intern(&rule.head);
                let body = match keyword.as_str() {
                    "role_universal" => RoleBody::Universal,
                    "role_atomic_state" => {
                        let (tag, index) = self.predicate(self.symbol_arg(args, 0)?, 2)?;
                        RoleBody::AtomicState(tag, index)
                    }
                    "role_atomic_goal" => {
                        let (tag, index) = self.predicate(self.symbol_arg(args, 0)?, 2)?;
                        RoleBody::AtomicGoal(tag, index, Self::polarity_arg(args, 1)?)
                    }
                    "role_intersection" | "role_union" | "role_composition" => {
                        let left = Self::nonterminal_arg(args, 0, &mut self.roles)?;
                        let right = Self::nonterminal_arg(args, 1, &mut self.roles)?;
                        match keyword.as_str() {
                            "role_intersection" => RoleBody::Intersection(left, right),
                            "role_union" => RoleBody::Union(left, right),
                            _ => RoleBody::Composition(left, right),
                        }
                    }
                    "role_complement" | "role_inverse" | "role_transitive_closure"
                    | "role_reflexive_transitive_closure" => {
                        let inner = Self::nonterminal_arg(args, 0, &mut self.roles)?;
                        match keyword.as_str() {
                            "role_complement" => RoleBody::Complement(inner),
                            "role_inverse" => RoleBody::Inverse(inner),
                            "role_transitive_closure" => RoleBody::TransitiveClosure(inner),
                            _ => RoleBody::ReflexiveTransitiveClosure(inner),
                        }
                    }
                    "role_restriction" => {
                        let role = Self::nonterminal_arg(args, 0, &mut self.roles)?;
                        let concept = Self::nonterminal_arg(args, 1, &mut self.concepts)?;
                        RoleBody::Restriction(role, concept)
                    }
                    "role_identity" => {
                        RoleBody::Identity(Self::nonterminal_arg(args, 0, &mut self.concepts)?)
                    }
                    _ => unreachable!(),
                };
                self.grammar.role_rules.push(DerivationRule { head, body });
            }

            "boolean_atomic_state" | "boolean_nonempty" => {
                let head = self.booleans.intern(&rule.head);
                let body = match keyword.as_str() {
                    "boolean_atomic_state" => {
                        let (tag, index) = self.predicate(self.symbol_arg(args, 0)?, 0)?;
                        BooleanBody::AtomicState(tag, index)
                    }
                    _ => match args.first() {
                        Some(RawArg::NonTerminal(name)) => {
                            if self.is_role_nonterminal(name) {
                                BooleanBody::NonemptyRole(self.roles.intern(name))
                            } else {
                                BooleanBody::NonemptyConcept(self.concepts.intern(name))
                            }
                        }
                        _ => {
                            return Err(GrammarError::Parse(
                                "boolean_nonempty expects a nonterminal argument".to_string(),
                            ))
                        }
                    },
                };
                self.grammar
                    .boolean_rules
                    .push(DerivationRule { head, body });
            }

            "numerical_count" | "numerical_distance" => {
                let head = self.numericals.intern(&rule.head);
                let body = match keyword.as_str() {
                    "numerical_count" => match args.first() {
                        Some(RawArg::NonTerminal(name)) => {
                            if self.is_role_nonterminal(name) {
                                NumericalBody::CountRole(self.roles.intern(name))
                            } else {
                                NumericalBody::CountConcept(self.concepts.intern(name))
                            }
                        }
                        _ => {
                            return Err(GrammarError::Parse(
                                "numerical_count expects a nonterminal argument".to_string(),
                            ))
                        }
                    },
                    _ => {
                        let source = Self::nonterminal_arg(args, 0, &mut self.concepts)?;
                        let role = Self::nonterminal_arg(args, 1, &mut self.roles)?;
                        let target = Self::nonterminal_arg(args, 2, &mut self.concepts)?;
                        NumericalBody::Distance(source, role, target)
                    }
                };
                self.grammar
                    .numerical_rules
                    .push(DerivationRule { head, body });
            }

            unknown => return Err(GrammarError::UnknownKeyword(unknown.to_string())),
        }
        Ok(())
    }

    /// Resolves substitution rules: the tag of a rule is the tag its body
    /// non-terminal was defined with, propagated to the head.
    fn resolve_substitutions(&mut self, rules: &[RawRule]) -> Result<(), GrammarError> {
        let mut pending: Vec<(&str, &str)> = rules
            .iter()
            .filter_map(|rule| match &rule.body {
                RawBody::Substitution(body) => Some((rule.head.as_str(), body.as_str())),
                RawBody::Derivation { .. } => None,
            })
            .collect();

        loop {
            let mut progressed = false;
            pending.retain(|&(head, body)| {
                let tag = if self.concepts.table.contains_key(body) {
                    Some(FeatureTag::Concept)
                } else if self.roles.table.contains_key(body) {
                    Some(FeatureTag::Role)
                } else if self.booleans.table.contains_key(body) {
                    Some(FeatureTag::Boolean)
                } else if self.numericals.table.contains_key(body) {
                    Some(FeatureTag::Numerical)
                } else {
                    None
                };
                match tag {
                    None => true,
                    Some(tag) => {
                        let (interner, substitutions) = match tag {
                            FeatureTag::Concept => {
                                (&mut self.concepts, &mut self.grammar.concept_substitutions)
                            }
                            FeatureTag::Role => {
                                (&mut self.roles, &mut self.grammar.role_substitutions)
                            }
                            FeatureTag::Boolean => {
                                (&mut self.booleans, &mut self.grammar.boolean_substitutions)
                            }
                            FeatureTag::Numerical => (
                                &mut self.numericals,
                                &mut self.grammar.numerical_substitutions,
                            ),
                        };
                        let head = interner.intern(head);
                        let body = interner.intern(body);
                        substitutions.push(SubstitutionRule { head, body });
                        progressed = true;
                        false
                    }
                }
            });
            if pending.is_empty() {
                return Ok(());
            }
            if !progressed {
                return Err(GrammarError::UndefinedBodyNonTerminal(
                    pending[0].1.to_string(),
                ));
            }
        }
    }

    /// A start line `<tag_start> = <nt>` declares the start symbol and an
    /// implicit substitution rule from `<nt>` into it, so the start symbol
    /// appears only in heads.
    fn resolve_starts(&mut self, starts: &[(String, String)]) -> Result<(), GrammarError> {
        for (lhs, rhs) in starts {
            match lhs.as_str() {
                "concept_start" => {
                    let head = self.concepts.intern(lhs);
                    let body = self.concepts.intern(rhs);
                    self.grammar.concept_start = Some(head);
                    self.grammar
                        .concept_substitutions
                        .push(SubstitutionRule { head, body });
                }
                "role_start" => {
                    let head = self.roles.intern(lhs);
                    let body = self.roles.intern(rhs);
                    self.grammar.role_start = Some(head);
                    self.grammar
                        .role_substitutions
                        .push(SubstitutionRule { head, body });
                }
                "boolean_start" => {
                    let head = self.booleans.intern(lhs);
                    let body = self.booleans.intern(rhs);
                    self.grammar.boolean_start = Some(head);
                    self.grammar
                        .boolean_substitutions
                        .push(SubstitutionRule { head, body });
                }
                "numerical_start" => {
                    let head = self.numericals.intern(lhs);
                    let body = self.numericals.intern(rhs);
                    self.grammar.numerical_start = Some(head);
                    self.grammar
                        .numerical_substitutions
                        .push(SubstitutionRule { head, body });
                }
                other => {
                    return Err(GrammarError::Parse(format!(
                        "unknown start symbol section entry <{other}>"
                    )))
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn parse_grammar(text: &str, task: &Task) -> Result<Grammar, GrammarError> {
    let (rest, raw) = raw_grammar(Span::new(text))
        .map_err(|error| GrammarError::Parse(error.to_string()))?;
    if !rest.fragment().trim().is_empty() {
        return Err(GrammarError::Parse(format!(
            "trailing grammar text: {}",
            rest.fragment().trim()
        )));
    }

    let mut elaboration = Elaboration {
        task,
        concepts: NonTerminals::default(),
        roles: NonTerminals::default(),
        booleans: NonTerminals::default(),
        numericals: NonTerminals::default(),
        grammar: Grammar::default(),
    };

    for rule in &raw.rules {
        elaboration.elaborate_rule(rule)?;
    }
    elaboration.resolve_substitutions(&raw.rules)?;
    elaboration.resolve_starts(&raw.starts)?;

    elaboration.grammar.concept_nonterminals = elaboration.concepts.names;
    elaboration.grammar.role_nonterminals = elaboration.roles.names;
    elaboration.grammar.boolean_nonterminals = elaboration.booleans.names;
    elaboration.grammar.numerical_nonterminals = elaboration.numericals.names;
    Ok(elaboration.grammar)
}
