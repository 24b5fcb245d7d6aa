// tests/parser_tests.rs

use datastep_lang::ast::{Block, CompareOp, ProcName, Statement};
use datastep_lang::parser::Grammar;
use datastep_lang::plan::{
    Clause, ClauseKind, PlanBuilder, PlanError, PlotRequest, Procedure, SourceRef, Step,
    WhereClause,
};

fn parse_blocks(source: &str) -> Vec<Block> {
    Grammar::new().parse(source).unwrap().blocks
}

fn plan(source: &str) -> Result<Vec<Step>, PlanError> {
    let script = Grammar::new().parse(source).unwrap();
    PlanBuilder::new().build(&script)
}

fn statements(block: &Block) -> Vec<Statement> {
    block.statements().iter().map(|s| s.node.clone()).collect()
}

// ============================================================================
// Blocks
// ============================================================================

#[test]
fn test_data_block() {
    let blocks = parse_blocks("DATA adults; SET people.csv; WHERE age > 30; RUN;");
    assert_eq!(blocks.len(), 1);

    let Block::Data { name, .. } = &blocks[0] else {
        panic!("expected a DATA block");
    };
    assert_eq!(name, "adults");
    assert_eq!(
        statements(&blocks[0]),
        vec![
            Statement::Set {
                path: "people.csv".into(),
                sheet: None
            },
            Statement::Where {
                column: "age".into(),
                op: CompareOp::GreaterThan,
                literal: "30".into()
            },
        ]
    );
}

#[test]
fn test_keywords_are_case_insensitive() {
    let blocks = parse_blocks("data d; set x.csv; keep a; Run;\nproc Means; run;");
    assert_eq!(blocks.len(), 2);
    assert!(matches!(blocks[1], Block::Proc { name: ProcName::Means, .. }));
}

#[test]
fn test_blocks_close_without_run() {
    let blocks = parse_blocks("DATA a; SET a.csv;\nPROC PRINT;\nPROC MEANS;");
    assert_eq!(blocks.len(), 3);
    assert!(matches!(blocks[2], Block::Proc { name: ProcName::Means, .. }));

    let starts: Vec<(usize, usize)> = blocks
        .iter()
        .map(|b| (b.position().line, b.position().column))
        .collect();
    assert_eq!(starts, vec![(1, 1), (2, 1), (3, 1)]);
}

#[test]
fn test_quit_closes_a_block() {
    let blocks = parse_blocks("PROC FREQ; TABLES a; QUIT;");
    assert_eq!(statements(&blocks[0]), vec![Statement::Tables(vec!["a".into()])]);
}

#[test]
fn test_comments_between_statements() {
    let blocks = parse_blocks("/* load */ DATA a; /* source */ SET a.csv; RUN;");
    assert_eq!(statements(&blocks[0]).len(), 1);
}

#[test]
fn test_proc_options() {
    let blocks = parse_blocks("PROC REG DATA=work PLOTS; MODEL y = x; RUN;");
    let Block::Proc { options, .. } = &blocks[0] else {
        panic!("expected a PROC block");
    };
    assert_eq!(options.len(), 2);
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_column_lists_accept_commas_or_spaces() {
    let blocks = parse_blocks("DATA d; SET x.csv; KEEP name,age, income; DROP a b; RUN;");
    let columns = statements(&blocks[0]);
    assert_eq!(
        columns[1],
        Statement::Keep(vec!["name".into(), "age".into(), "income".into()])
    );
    assert_eq!(columns[2], Statement::Drop(vec!["a".into(), "b".into()]));
}

#[test]
fn test_rename_pairs() {
    let blocks = parse_blocks("DATA d; SET x.csv; RENAME a=b c = d, e=f; RUN;");
    assert_eq!(
        statements(&blocks[0])[1],
        Statement::Rename(vec![
            ("a".into(), "b".into()),
            ("c".into(), "d".into()),
            ("e".into(), "f".into())
        ])
    );
}

#[test]
fn test_where_operators() {
    let test_cases = vec![
        ("=", CompareOp::Equal),
        ("!=", CompareOp::NotEqual),
        ("^=", CompareOp::NotEqual),
        (">", CompareOp::GreaterThan),
        ("<", CompareOp::LessThan),
        (">=", CompareOp::GreaterEqual),
        ("<=", CompareOp::LessEqual),
        ("EQ", CompareOp::Equal),
        ("ne", CompareOp::NotEqual),
        ("Gt", CompareOp::GreaterThan),
        ("LT", CompareOp::LessThan),
        ("GE", CompareOp::GreaterEqual),
        ("le", CompareOp::LessEqual),
    ];

    for (symbol, expected) in test_cases {
        let source = format!("DATA d; SET x.csv; WHERE age {} 30; RUN;", symbol);
        let blocks = parse_blocks(&source);
        let Statement::Where { op, .. } = &statements(&blocks[0])[1] else {
            panic!("expected WHERE for {}", symbol);
        };
        assert_eq!(*op, expected, "Failed for operator: {}", symbol);
    }
}

#[test]
fn test_where_literal_kinds() {
    let test_cases = vec![
        ("WHERE gender = F;", "F"),
        ("WHERE city = \"New York\";", "New York"),
        ("WHERE zip = 02134;", "02134"),
        ("WHERE delta > -1.5;", "-1.5"),
    ];

    for (statement, expected) in test_cases {
        let source = format!("DATA d; SET x.csv; {} RUN;", statement);
        let blocks = parse_blocks(&source);
        let Statement::Where { literal, .. } = &statements(&blocks[0])[1] else {
            panic!("expected WHERE in {}", statement);
        };
        assert_eq!(literal, expected, "Failed for: {}", statement);
    }
}

#[test]
fn test_set_with_sheet() {
    let blocks = parse_blocks("DATA d; SET path=\"book.xlsx\" (sheet='Q1 2024'); RUN;");
    assert_eq!(
        statements(&blocks[0])[0],
        Statement::Set {
            path: "book.xlsx".into(),
            sheet: Some("Q1 2024".into())
        }
    );
}

#[test]
fn test_tables_separators() {
    for source in ["TABLES gender*age;", "TABLES gender age;", "TABLES gender, age;"] {
        let blocks = parse_blocks(&format!("PROC FREQ; {} RUN;", source));
        assert_eq!(
            statements(&blocks[0]),
            vec![Statement::Tables(vec!["gender".into(), "age".into()])],
            "Failed for: {}",
            source
        );
    }
}

#[test]
fn test_model_and_plot() {
    let blocks = parse_blocks("PROC REG; MODEL income = age tenure; PLOT income*age; RUN;");
    assert_eq!(
        statements(&blocks[0]),
        vec![
            Statement::Model {
                dependent: "income".into(),
                independent: vec!["age".into(), "tenure".into()]
            },
            Statement::Plot {
                y: "income".into(),
                x: "age".into()
            },
        ]
    );
}

// ============================================================================
// Syntax Errors
// ============================================================================

#[test]
fn test_syntax_errors() {
    let test_cases = vec![
        ("DATA d; SORT x; RUN;", "unknown statement 'SORT'"),
        ("KEEP a;", "must appear inside a DATA or PROC step"),
        ("PROC SUMMARY; RUN;", "unknown procedure 'SUMMARY'"),
        ("PROC PRINT NOOBS; RUN;", "unknown PROC option 'NOOBS'"),
        ("DATA d; SET x.csv; KEEP; RUN;", "KEEP expects at least one column"),
        ("DATA d; SET x.csv; WHERE age LIKE 3; RUN;", "unknown comparison operator 'LIKE'"),
        ("DATA d; SET x.csv; WHERE age > ; RUN;", "expected a value to compare against"),
        ("DATA d; SET x.csv (range=A1); RUN;", "unknown SET option 'range'"),
        ("PROC PRINT; OBS many; RUN;", "expected a number after OBS"),
        ("DATA d SET x.csv; RUN;", "expected ';'"),
        ("PROC REG; PLOT y x; RUN;", "expected '*'"),
        ("42;", "expected DATA or PROC"),
    ];

    let grammar = Grammar::new();
    for (source, expected) in test_cases {
        let err = grammar.parse(source).unwrap_err();
        assert!(
            err.message.contains(expected),
            "For {:?} expected {:?}, got {:?}",
            source,
            expected,
            err.message
        );
    }
}

#[test]
fn test_syntax_error_position() {
    let err = Grammar::new()
        .parse("DATA d;\n  SET x.csv;\n  FILTER a;\nRUN;")
        .unwrap_err();
    assert_eq!(err.position.line, 3);
    assert_eq!(err.position.column, 3);
    assert_eq!(
        err.to_string(),
        "syntax error at line 3, column 3: unknown statement 'FILTER'"
    );
}

#[test]
fn test_grammar_is_reusable() {
    let grammar = Grammar::new();
    assert!(grammar.parse("PROC MEANS; RUN;").is_ok());
    assert!(grammar.parse("PROC MEANS RUN;").is_err());
    assert!(grammar.parse("PROC MEANS; RUN;").is_ok());
}

// ============================================================================
// Plan Builder
// ============================================================================

#[test]
fn test_plan_preserves_script_order() {
    let steps = plan("PROC MEANS; RUN; DATA a; SET a.csv; RUN; PROC PRINT; RUN;").unwrap();
    let kinds: Vec<String> = steps.iter().map(Step::describe).collect();
    assert_eq!(kinds, vec!["PROC MEANS", "DATA a", "PROC PRINT"]);
}

#[test]
fn test_data_step_plan() {
    let steps = plan(
        "DATA d; SET \"book.xlsx\" (sheet=Q1); RENAME income=salary; KEEP income; WHERE age > 30; RUN;",
    )
    .unwrap();

    let Step::Data(data) = &steps[0] else {
        panic!("expected a DATA step");
    };
    assert_eq!(data.source, SourceRef::new("book.xlsx").with_sheet("Q1"));

    let declared: Vec<ClauseKind> = data.clauses.declared().iter().map(Clause::kind).collect();
    assert_eq!(declared, vec![ClauseKind::Rename, ClauseKind::Keep, ClauseKind::Where]);

    let canonical: Vec<ClauseKind> = data.clauses.canonical().iter().map(|c| c.kind()).collect();
    assert_eq!(canonical, vec![ClauseKind::Where, ClauseKind::Keep, ClauseKind::Rename]);

    assert_eq!(
        data.clauses.canonical()[0],
        &Clause::Where(WhereClause {
            column: "age".into(),
            op: CompareOp::GreaterThan,
            literal: "30".into()
        })
    );
}

#[test]
fn test_repeated_clause_last_wins() {
    let steps = plan("DATA d; SET x.csv; KEEP a; KEEP b; RUN;").unwrap();
    let Step::Data(data) = &steps[0] else {
        panic!("expected a DATA step");
    };
    assert_eq!(data.clauses.declared(), &[Clause::Keep(vec!["b".into()])]);
}

#[test]
fn test_drop_is_a_set() {
    let steps = plan("DATA d; SET x.csv; DROP b a b; RUN;").unwrap();
    let Step::Data(data) = &steps[0] else {
        panic!("expected a DATA step");
    };
    let Clause::Drop(columns) = &data.clauses.declared()[0] else {
        panic!("expected DROP");
    };
    assert_eq!(columns.iter().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn test_proc_plans() {
    let steps = plan(
        "PROC PRINT DATA=d OBS=3; VAR name; RUN;
         PROC MEANS; VAR age; RUN;
         PROC FREQ; TABLES a*b*c; RUN;
         PROC REG PLOTS; MODEL y = x; RUN;
         PROC REG; MODEL y = x; PLOT y*x; RUN;",
    )
    .unwrap();

    let Step::Proc(print) = &steps[0] else {
        panic!("expected PROC PRINT");
    };
    assert_eq!(print.data.as_deref(), Some("d"));
    let Procedure::Print(params) = &print.procedure else {
        panic!("expected print params");
    };
    assert_eq!(params.obs, Some(3));
    assert_eq!(params.var, Some(vec!["name".to_string()]));

    let Step::Proc(means) = &steps[1] else {
        panic!("expected PROC MEANS");
    };
    assert!(matches!(&means.procedure, Procedure::Means(p) if p.var == Some(vec!["age".to_string()])));

    // more than two TABLES columns is reported when the step runs
    let Step::Proc(freq) = &steps[2] else {
        panic!("expected PROC FREQ");
    };
    assert!(matches!(&freq.procedure, Procedure::Freq(p) if p.tables.as_ref().map(Vec::len) == Some(3)));

    let Step::Proc(auto) = &steps[3] else {
        panic!("expected PROC REG");
    };
    assert!(matches!(&auto.procedure, Procedure::Reg(p) if p.plot == Some(PlotRequest::Auto)));

    let Step::Proc(explicit) = &steps[4] else {
        panic!("expected PROC REG");
    };
    let Procedure::Reg(params) = &explicit.procedure else {
        panic!("expected reg params");
    };
    assert_eq!(
        params.plot,
        Some(PlotRequest::Columns {
            x: "x".into(),
            y: "y".into()
        })
    );
}

#[test]
fn test_plan_errors() {
    assert!(matches!(
        plan("DATA d; KEEP a; RUN;"),
        Err(PlanError::MissingSet { ref step, .. }) if step == "d"
    ));
    assert!(matches!(
        plan("DATA d; SET a.csv; SET b.csv; RUN;"),
        Err(PlanError::DuplicateSet { .. })
    ));
    assert!(matches!(plan("PROC REG; RUN;"), Err(PlanError::MissingModel { .. })));
    assert!(matches!(
        plan("PROC REG; MODEL y = ; RUN;"),
        Err(PlanError::EmptyModel { ref dependent, .. }) if dependent == "y"
    ));
    assert!(matches!(
        plan("PROC PRINT; OBS 2.5; RUN;"),
        Err(PlanError::InvalidObs { ref value, .. }) if value == "2.5"
    ));
    assert!(matches!(
        plan("PROC PRINT; OBS -1; RUN;"),
        Err(PlanError::InvalidObs { .. })
    ));
}

#[test]
fn test_statement_in_wrong_step() {
    let test_cases = vec![
        ("DATA d; SET x.csv; VAR a; RUN;", "VAR", "DATA step 'd'"),
        ("PROC MEANS; TABLES a; RUN;", "TABLES", "PROC MEANS"),
        ("PROC FREQ; MODEL y = x; RUN;", "MODEL", "PROC FREQ"),
        ("PROC PRINT; SET x.csv; RUN;", "SET", "PROC PRINT"),
        ("PROC MEANS PLOTS; RUN;", "PLOTS", "PROC MEANS"),
    ];

    for (source, expected_statement, expected_context) in test_cases {
        match plan(source) {
            Err(PlanError::UnexpectedStatement {
                statement, context, ..
            }) => {
                assert_eq!(statement, expected_statement, "Failed for: {}", source);
                assert_eq!(context, expected_context, "Failed for: {}", source);
            }
            other => panic!("expected UnexpectedStatement for {}, got {:?}", source, other),
        }
    }
}
