//! Property-based tests for the scanner and parser.
//!
//! These tests use `proptest` to check invariants over generated inputs:
//!
//! 1. **Scanner never panics** on arbitrary bytes
//! 2. **Scanner is deterministic**: same bytes, same tokens
//! 3. **Tokens are ordered** and each token's text sits at its location
//! 4. **Checkpoint law**: every production, run on its own, leaves the
//!    cursor where it was when it does not match, from any starting position
//! 5. **Round trip**: the leaves of a parsed module are the token stream
//! 6. **Parser never panics** on token streams with a token removed

use proptest::prelude::*;

use super::lexer::{scan, Token};
use super::parse::{parse, Parser, Production};

// ============================================================================
// Generators
// ============================================================================

/// Modules that must scan and parse cleanly.
const VALID_MODULES: &[&str] = &[
    "MODULE M; END M.",
    "MODULE Hello; IMPORT Out; BEGIN Out.String(\"hi\"); Out.Ln END Hello.",
    "MODULE A; CONST N* = 10; Max = N * 2 + 1; VAR x, y: INTEGER; BEGIN x := N; y := x DIV 3 END A.",
    "MODULE Lists;
       IMPORT T := Texts, Out;
       TYPE Node* = POINTER TO NodeDesc;
         NodeDesc* = RECORD key*: INTEGER; next: Node END;
       VAR head: Node;
       PROCEDURE Insert*(VAR list: Node; key: INTEGER);
         VAR n: Node;
       BEGIN NEW(n); n.key := key; n^.next := list; list := n
       END Insert;
       PROCEDURE Count(list: Node): INTEGER;
         VAR c: INTEGER;
       BEGIN c := 0;
         WHILE list # NIL DO INC(c); list := list.next END
       RETURN c
       END Count;
     END Lists.",
    "MODULE Flow;
       VAR i, s: INTEGER; ch: CHAR; set: SET; ok: BOOLEAN;
     BEGIN
       FOR i := 1 TO 10 BY 2 DO s := s + i END;
       IF s > 10 THEN ok := TRUE ELSIF s = 0 THEN ok := FALSE ELSE ok := ~ok END;
       CASE ch OF \"A\"..\"Z\": s := 1 | \"0\", \"9\": s := 2 | END;
       REPEAT s := s - 1 UNTIL s <= 0;
       set := {1, 3..5};
       ok := (i IN set) & (s >= 0) OR (3.5E2 / 2.0 < 1.0)
     END Flow.",
    "MODULE Shapes;
       TYPE Shape = RECORD x, y: REAL END;
         Circle = RECORD (Shape) r: REAL; END;
         Grid = ARRAY 4, 4 OF ARRAY 2 OF INTEGER;
         Handler = PROCEDURE (VAR s: Shape; args: ARRAY OF ARRAY OF CHAR): BOOLEAN;
       VAR g: Grid; c: Circle;
     BEGIN g[1, 2][0] := 0FFH; c.r := 1.5;;
     END Shapes.",
];

fn valid_module() -> impl Strategy<Value = &'static str> {
    prop::sample::select(VALID_MODULES)
}

fn tokens_of(source: &str) -> Vec<Token> {
    scan(source.as_bytes())
        .into_result()
        .unwrap_or_else(|err| panic!("sample failed to scan: {err}"))
}

type Rule<'t> = fn(&mut Parser<'t>) -> Production;

fn rules<'t>() -> [(&'static str, Rule<'t>); 50] {
    [
        // declarations
        ("module", Parser::parse_module),
        ("importList", Parser::parse_import_list),
        ("import", Parser::parse_import),
        ("declarationSequence", Parser::parse_declaration_sequence),
        ("constDeclaration", Parser::parse_const_declaration),
        ("typeDeclaration", Parser::parse_type_declaration),
        ("varDeclaration", Parser::parse_var_declaration),
        ("procedureDeclaration", Parser::parse_procedure_declaration),
        ("procedureHeading", Parser::parse_procedure_heading),
        ("procedureBody", Parser::parse_procedure_body),
        ("formalParameters", Parser::parse_formal_parameters),
        ("fpSection", Parser::parse_fp_section),
        ("formalType", Parser::parse_formal_type),
        ("identdef", Parser::parse_identdef),
        ("identList", Parser::parse_ident_list),
        // types
        ("type", Parser::parse_type),
        ("structType", Parser::parse_struct_type),
        ("arrayType", Parser::parse_array_type),
        ("recordType", Parser::parse_record_type),
        ("fieldListSequence", Parser::parse_field_list_sequence),
        ("fieldList", Parser::parse_field_list),
        ("pointerType", Parser::parse_pointer_type),
        ("procedureType", Parser::parse_procedure_type),
        // statements
        ("statementSequence", Parser::parse_statement_sequence),
        ("statement", Parser::parse_statement),
        ("assignment", Parser::parse_assignment),
        ("procedureCall", Parser::parse_procedure_call),
        ("ifStatement", Parser::parse_if_statement),
        ("caseStatement", Parser::parse_case_statement),
        ("case", Parser::parse_case),
        ("caseLabelList", Parser::parse_case_label_list),
        ("labelRange", Parser::parse_label_range),
        ("label", Parser::parse_label),
        ("whileStatement", Parser::parse_while_statement),
        ("repeatStatement", Parser::parse_repeat_statement),
        ("forStatement", Parser::parse_for_statement),
        // expressions
        ("expression", Parser::parse_expression),
        ("relation", Parser::parse_relation),
        ("simpleExpression", Parser::parse_simple_expression),
        ("addOperator", Parser::parse_add_operator),
        ("term", Parser::parse_term),
        ("mulOperator", Parser::parse_mul_operator),
        ("factor", Parser::parse_factor),
        ("designator", Parser::parse_designator),
        ("selector", Parser::parse_selector),
        ("qualident", Parser::parse_qualident),
        ("expList", Parser::parse_exp_list),
        ("actualParameters", Parser::parse_actual_parameters),
        ("set", Parser::parse_set),
        ("element", Parser::parse_element),
    ]
}

/// Byte offset of every line start, for locating tokens in the source.
fn line_starts(source: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(source.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

#[test]
fn rules_are_listed_once() {
    let names: std::collections::BTreeSet<&str> =
        rules().iter().map(|(name, _)| *name).collect();
    assert_eq!(names.len(), rules().len());
}

// ============================================================================
// Property tests
// ============================================================================

/// Default is 512 cases; override via `PROPTEST_CASES` env var for nightly runs.
fn proptest_config() -> ProptestConfig {
    let default = ProptestConfig::default();
    ProptestConfig {
        cases: default.cases.max(512),
        ..default
    }
}

proptest! {
    #![proptest_config(proptest_config())]

    /// Property 1: Scanner never panics on arbitrary bytes.
    #[test]
    fn scanner_never_panics(input in prop::collection::vec(any::<u8>(), 0..500)) {
        let _output = scan(&input);
    }

    /// Property 2: Scanner is deterministic.
    #[test]
    fn scanner_deterministic(input in "\\PC{0,200}") {
        let first = scan(input.as_bytes());
        let second = scan(input.as_bytes());
        prop_assert_eq!(first, second, "scans differ for input {:?}", input);
    }

    /// Property 3: Tokens come out in source order, and each token's text is
    /// found in the source at the token's line and column.
    #[test]
    fn tokens_match_source(input in "[ -~\n]{0,300}") {
        let output = scan(input.as_bytes());
        let starts = line_starts(&input);

        for window in output.tokens.windows(2) {
            let (prev, next) = (&window[0], &window[1]);
            prop_assert!(
                (prev.line(), prev.column()) < (next.line(), next.column()),
                "{} not before {} in {:?}",
                prev,
                next,
                input,
            );
        }

        for token in &output.tokens {
            let offset = starts[token.line() - 1] + token.column() - 1;
            prop_assert!(
                input[offset..].starts_with(&token.text),
                "{} not found at {} in {:?}",
                token,
                token.location,
                input,
            );
        }
    }

    /// Property 4: Checkpoint law. From any cursor position, a production
    /// that does not match (or fails) leaves the cursor unchanged.
    #[test]
    fn checkpoint_law(source in valid_module(), index in any::<prop::sample::Index>()) {
        let tokens = tokens_of(source);
        let start = index.index(tokens.len() + 1);

        for (name, rule) in rules() {
            let mut parser = Parser::new(&tokens);
            parser.position = start;
            let result = rule(&mut parser);
            if !matches!(result, Ok(Some(_))) {
                prop_assert_eq!(
                    parser.position,
                    start,
                    "{} moved the cursor from {} in {:?}",
                    name,
                    start,
                    source,
                );
            }
        }
    }

    /// Property 5: The terminal leaves of a parsed module are the tokens.
    #[test]
    fn round_trip(source in valid_module()) {
        let tokens = tokens_of(source);
        let tree = parse(&tokens);
        prop_assert!(tree.is_ok(), "sample failed to parse: {:?}", tree);
        let tree = tree.unwrap();

        let leaves: Vec<&str> = tree.terminals().iter().map(|leaf| leaf.label()).collect();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        prop_assert_eq!(leaves, texts);
    }

    /// Property 6: Removing any one token never panics the parser, and any
    /// error points inside the stream.
    #[test]
    fn parser_never_panics_on_damaged_input(
        source in valid_module(),
        index in any::<prop::sample::Index>(),
    ) {
        let mut tokens = tokens_of(source);
        tokens.remove(index.index(tokens.len()));

        if let Err(err) = parse(&tokens) {
            prop_assert!(err.index() <= tokens.len(), "{} out of range", err);
        }
    }
}
