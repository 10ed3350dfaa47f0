//! Cross-cutting engine scenarios: prefix capture, right recursion,
//! rejected grammars, token-mode input and memoized grammars.

use std::rc::Rc;

use retrace::combinators::{
    choice, collect, object_pred, recursive, seq, string,
};
use retrace::{
    memo, parse_objects, parse_text, Grammar, Item, ParseOptions, ParseOutcome, ParserRef, Source,
};

#[test]
fn prefix_capture_blocks_the_longer_alternative() {
    // C := A 'b', A := "a" / "aa". On "aab" the choice commits to "a"
    // and the sequence dies at the second 'a'.
    let c = seq([choice([string("a"), string("aa")]), string("b")]);
    let outcome = parse_text(&c, "aab", ParseOptions::default()).unwrap();
    assert!(!outcome.is_success());

    // Swapping the order fixes it.
    let c = seq([choice([string("aa"), string("a")]), string("b")]);
    let outcome = parse_text(&c, "aab", ParseOptions::default()).unwrap();
    assert_eq!(outcome.end_pos(), Some(3));
}

#[derive(Debug, PartialEq)]
enum Chain {
    Leaf,
    Link(Rc<Chain>),
}

fn chain_depth(chain: &Chain) -> usize {
    match chain {
        Chain::Leaf => 1,
        Chain::Link(inner) => 1 + chain_depth(inner),
    }
}

#[test]
fn right_recursion_builds_right_leaning_chains() {
    // R := "ab" R / "ab"
    let r = recursive(|r| {
        choice([
            collect(seq([string("ab"), r]), |_, _, frame| {
                let inner = frame[0].downcast_ref::<Chain>().unwrap();
                let rebuilt = match inner {
                    Chain::Leaf => Chain::Leaf,
                    Chain::Link(next) => Chain::Link(next.clone()),
                };
                Rc::new(Chain::Link(Rc::new(rebuilt)))
            }),
            collect(string("ab"), |_, _, _| Rc::new(Chain::Leaf)),
        ])
    });

    let outcome = parse_text(&r, "ababab", ParseOptions::default()).unwrap();
    assert_eq!(outcome.end_pos(), Some(6));
    let chain = outcome.ast()[0].downcast_ref::<Chain>().unwrap();
    assert_eq!(chain_depth(chain), 3);
}

#[test]
fn left_recursive_grammar_is_rejected_before_parsing() {
    // L := L "a" / "a"
    let l = recursive(|l| choice([seq([l, string("a")]), string("a")]));
    let error = parse_text(&l, "aaa", ParseOptions::default()).unwrap_err();
    assert!(error.grammar_faults().is_some_and(|f| !f.is_empty()));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Ident,
    Number,
    Comma,
}

struct Token {
    kind: TokenKind,
}

fn token(kind: TokenKind) -> ParserRef {
    object_pred(
        match kind {
            TokenKind::Ident => "ident",
            TokenKind::Number => "number",
            TokenKind::Comma => "comma",
        },
        move |item| item.downcast_ref::<Token>().is_some_and(|t| t.kind == kind),
    )
}

#[test]
fn token_mode_parses_object_sequences() {
    // ident ',' number
    let parser = seq([
        token(TokenKind::Ident),
        token(TokenKind::Comma),
        token(TokenKind::Number),
    ]);
    let items: Vec<Item> = vec![
        Rc::new(Token {
            kind: TokenKind::Ident,
        }),
        Rc::new(Token {
            kind: TokenKind::Comma,
        }),
        Rc::new(Token {
            kind: TokenKind::Number,
        }),
    ];
    let outcome = parse_objects(&parser, items, ParseOptions::default()).unwrap();
    assert_eq!(outcome.end_pos(), Some(3));

    let items: Vec<Item> = vec![Rc::new(Token {
        kind: TokenKind::Number,
    })];
    let outcome = parse_objects(&parser, items, ParseOptions::default()).unwrap();
    let ParseOutcome::Failure { furthest_pos, causes } = outcome else {
        panic!("expected failure");
    };
    assert_eq!(furthest_pos, 0);
    assert!(causes.iter().any(|c| c == "ident"));
}

#[test]
fn memoized_grammar_matches_the_plain_one() {
    let plain = |word: ParserRef| {
        choice([
            seq([word.clone(), string("!")]),
            seq([word, string("?")]),
        ])
    };
    let direct = plain(string("hello"));
    let memoized = plain(memo(string("hello")));

    for input in ["hello!", "hello?", "hello", "help"] {
        let a = parse_text(&direct, input, ParseOptions::default()).unwrap();
        let b = parse_text(&memoized, input, ParseOptions::default()).unwrap();
        assert_eq!(a.is_success(), b.is_success(), "{input:?}");
        assert_eq!(a.end_pos(), b.end_pos(), "{input:?}");
    }
}

#[test]
fn grammar_registration_keeps_rules_alive_and_parses() {
    let rule = recursive(|p| choice([seq([string("("), p, string(")")]), string("x")]));
    let grammar = Grammar::new(rule.clone()).register(rule);
    grammar.validate().unwrap();
    let outcome = grammar
        .parse(Source::text("((x))"), ParseOptions::default())
        .unwrap();
    assert_eq!(outcome.end_pos(), Some(5));
}
