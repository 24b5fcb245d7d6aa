// tests/integration_tests.rs

use datastep_lang::output::StepResult;
use datastep_lang::plan::{PlanError, SourceRef};
use datastep_lang::{
    Environment, FatalError, FileLoader, Grammar, Interpreter, OutputFormat, PlanBuilder,
    PngChartRenderer, Request, Response, RunOptions, run_script,
};
use serde_json::{Value as Json, json};

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn loader() -> FileLoader {
    FileLoader::with_base_dir(FIXTURES)
}

fn run_request(request: &Request) -> Result<Response, FatalError> {
    run_script(&Grammar::new(), request, &loader(), &PngChartRenderer::default())
}

fn run(code: &str) -> Response {
    run_request(&Request::new(code)).unwrap()
}

fn run_json(code: &str) -> Json {
    serde_json::to_value(run(code)).unwrap()
}

fn run_err(code: &str) -> FatalError {
    run_request(&Request::new(code)).unwrap_err()
}

// ============================================================================
// DATA Steps
// ============================================================================

#[test]
fn test_data_step_pipeline() {
    let json = run_json(
        "DATA d;
           SET employees.csv;
           WHERE age > 30;
           KEEP name, age, income;
           RENAME income=salary;
         RUN;",
    );

    assert_eq!(json["message"], json!("DATA step 'd' executed"));
    assert_eq!(json["columns"], json!(["name", "age", "salary"]));
    assert_eq!(json["shape"], json!([3, 3]));

    let preview = json["preview"].as_array().unwrap();
    assert_eq!(preview.len(), 3);
    for row in preview {
        assert!(row.get("salary").is_some(), "Failed for row: {}", row);
        assert!(row.get("income").is_none(), "Failed for row: {}", row);
        assert!(row["age"].as_f64().unwrap() > 30.0);
    }
}

#[test]
fn test_drop_leaves_remaining_columns() {
    let json = run_json("DATA d; SET employees.csv; DROP gender; RUN;");
    assert_eq!(json["columns"], json!(["id", "name", "age", "income"]));
    assert_eq!(json["shape"], json!([4, 4]));
}

#[test]
fn test_string_where_with_quoted_literal() {
    let json = run_json("DATA women; SET employees.csv; WHERE gender = 'F'; RUN;");
    assert_eq!(json["shape"], json!([2, 5]));
    assert_eq!(json["preview"][1]["name"], json!("Carol"));
}

#[test]
fn test_preview_is_capped_but_shape_is_not() {
    let json = run_json("DATA s; SET scores.csv; RUN;");
    assert_eq!(json["shape"], json!([6, 4]));
    assert_eq!(json["preview"].as_array().unwrap().len(), 5);
}

#[test]
fn test_missing_cells_load_as_null() {
    let json = run_json("DATA s; SET scores.csv; RUN;");
    assert_eq!(json["preview"][2]["score"], Json::Null);
    assert_eq!(json["preview"][2]["hours"], json!(3));
}

#[test]
fn test_where_skips_missing_cells() {
    let test_cases = vec![
        ("WHERE score > 60;", 3),
        ("WHERE score <= 60;", 2),
        ("WHERE score != 52;", 5),
        ("WHERE hours >= 1;", 5),
    ];

    for (clause, expected) in test_cases {
        let code = format!("DATA s; SET scores.csv; {} RUN;", clause);
        let json = run_json(&code);
        assert_eq!(json["shape"][0], json!(expected), "Failed for input: {}", clause);
    }
}

#[test]
fn test_trailing_dot_number_literal() {
    let json = run_json("DATA d; SET employees.csv; WHERE age >= 35.; RUN;");
    assert_eq!(json["shape"], json!([3, 5]));
}

#[test]
fn test_set_reads_dataset_from_earlier_step() {
    let response = run(
        "DATA women; SET employees.csv; WHERE gender = 'F'; RUN;
         DATA names; SET women; KEEP name; RUN;",
    );
    let json = serde_json::to_value(&response.results()[1]).unwrap();
    assert_eq!(json["shape"], json!([2, 1]));
    assert_eq!(json["preview"][0]["name"], json!("Alice"));
}

#[test]
fn test_data_step_html() {
    let request = Request {
        output_format: OutputFormat::Html,
        ..Request::new("DATA d; SET employees.csv; KEEP name; RUN;")
    };
    let json = serde_json::to_value(run_request(&request).unwrap()).unwrap();
    assert!(json.get("preview").is_none());
    let html = json["html"].as_str().unwrap();
    assert!(html.contains("<th>Obs</th>"));
    assert!(html.contains("<td>Dave</td>"));
}

// ============================================================================
// Response Shape
// ============================================================================

#[test]
fn test_single_step_is_flattened() {
    let response = run("DATA d; SET employees.csv; RUN;");
    assert!(matches!(response, Response::Single(StepResult::Data(_))));
    let json = serde_json::to_value(&response).unwrap();
    assert!(json.get("steps").is_none());
}

#[test]
fn test_multiple_steps_are_wrapped() {
    let json = run_json("DATA d; SET employees.csv; RUN; PROC MEANS; RUN;");
    assert_eq!(json["steps"], json!(2));
    assert_eq!(json["results"].as_array().unwrap().len(), 2);
    assert_eq!(json["results"][1]["statistics"]["age"]["mean"], json!(34.0));
}

#[test]
fn test_empty_script_has_no_results() {
    let json = run_json("/* nothing here */");
    assert_eq!(json, json!({"steps": 0, "results": []}));
}

// ============================================================================
// PROC Steps
// ============================================================================

#[test]
fn test_procs_read_current_dataset() {
    let response = run(
        "DATA adults; SET employees.csv; WHERE age > 30; RUN;
         PROC PRINT; RUN;
         PROC FREQ; TABLES gender; RUN;",
    );
    let results = response.results();
    assert_eq!(results[1].message(), "PROC PRINT: showing 3 of 3 rows");

    let StepResult::Freq(freq) = results[2] else {
        panic!("expected a freq result, got {:?}", results[2]);
    };
    let frequencies = freq.frequencies.as_ref().unwrap();
    assert_eq!(frequencies["gender"]["M"], 2);
    assert_eq!(frequencies["gender"]["F"], 1);
}

#[test]
fn test_data_option_selects_named_dataset() {
    let response = run(
        "DATA everyone; SET employees.csv; RUN;
         DATA women; SET employees.csv; WHERE gender = 'F'; RUN;
         PROC PRINT DATA=everyone; RUN;
         PROC PRINT; RUN;",
    );
    let results = response.results();
    assert_eq!(results[2].message(), "PROC PRINT: showing 4 of 4 rows");
    assert_eq!(results[3].message(), "PROC PRINT: showing 2 of 2 rows");
}

#[test]
fn test_print_obs_and_request_limit() {
    let request = Request {
        limit: 2,
        ..Request::new("DATA d; SET employees.csv; RUN; PROC PRINT; RUN; PROC PRINT OBS=3; RUN;")
    };
    let response = run_request(&request).unwrap();
    let results = response.results();
    assert_eq!(results[1].message(), "PROC PRINT: showing 2 of 4 rows");
    assert_eq!(results[2].message(), "PROC PRINT: showing 3 of 4 rows");
}

#[test]
fn test_soft_errors_do_not_stop_the_run() {
    let response = run(
        "DATA d; SET employees.csv; RUN;
         PROC FREQ; TABLES gender*age*income; RUN;
         PROC REG; MODEL salary = age; RUN;
         PROC MEANS; RUN;",
    );
    let results = response.results();
    assert_eq!(results.len(), 4);
    assert!(results[1].error_text().unwrap().contains("Only 1 or 2 columns supported"));
    assert_eq!(results[2].error_text(), Some("Dependent variable 'salary' not found"));
    assert!(!results[3].is_error());
}

#[test]
fn test_reg_drops_incomplete_rows() {
    let json = run_json("DATA s; SET scores.csv; RUN; PROC REG; MODEL score = hours; RUN;");
    let summary = &json["results"][1]["summary"];
    assert_eq!(summary["nobs"], json!(4));
    assert!(summary["coefficients"]["hours"].as_f64().unwrap() > 0.0);
}

#[test]
fn test_reg_with_plot_returns_chart() {
    let json = run_json(
        "DATA d; SET employees.csv; RUN;
         PROC REG; MODEL income = age; PLOT income*age; RUN;",
    );
    let reg = &json["results"][1];
    assert!(reg["chart_png_base64"].as_str().unwrap().len() > 100);
    assert!(reg.get("chart_error").is_none());
}

#[test]
fn test_means_on_scores_skips_missing() {
    let json = run_json("DATA s; SET scores.csv; RUN; PROC MEANS; RUN;");
    let stats = &json["results"][1]["statistics"];
    assert_eq!(stats["score"]["n"], json!(5));
    assert_eq!(stats["hours"]["n"], json!(5));
    assert_eq!(stats["hours"]["max"], json!(5.0));
}

// ============================================================================
// Dataset Recovery
// ============================================================================

#[test]
fn test_request_source_feeds_first_proc() {
    let request = Request {
        source: Some("employees.csv".into()),
        ..Request::new("PROC MEANS; RUN;")
    };
    let json = serde_json::to_value(run_request(&request).unwrap()).unwrap();
    assert_eq!(json["statistics"]["income"]["mean"], json!(55000.0));
}

#[test]
fn test_interpreter_environment_tracks_datasets() {
    let grammar = Grammar::new();
    let script = grammar
        .parse("DATA a; SET employees.csv; RUN; DATA b; SET a; KEEP id; RUN;")
        .unwrap();
    let steps = PlanBuilder::new().build(&script).unwrap();

    let loader = loader();
    let renderer = PngChartRenderer::default();
    let mut interpreter = Interpreter::new(&loader, &renderer, RunOptions::default());
    interpreter.run(&steps).unwrap();

    let env = interpreter.environment();
    assert_eq!(env.dataset_names(), vec!["a", "b"]);
    assert_eq!(env.current().unwrap().shape(), [4, 1]);
    // reading a registered dataset does not replace the last file source
    assert_eq!(env.last_source(), Some(&SourceRef::new("employees.csv")));
}

#[test]
fn test_seeded_environment_reloads_last_source() {
    let grammar = Grammar::new();
    let script = grammar.parse("PROC PRINT OBS=1; RUN;").unwrap();
    let steps = PlanBuilder::new().build(&script).unwrap();

    let loader = loader();
    let renderer = PngChartRenderer::default();
    let env = Environment::new().with_last_source(SourceRef::new("scores.csv"));
    let mut interpreter =
        Interpreter::with_environment(&loader, &renderer, RunOptions::default(), env);

    let results = interpreter.run(&steps).unwrap();
    assert_eq!(results[0].message(), "PROC PRINT: showing 1 of 6 rows");
    // PROC steps only read; the reload is not kept as the current dataset
    assert!(interpreter.environment().current().is_none());
    assert!(interpreter.environment().dataset_names().is_empty());
}

#[test]
fn test_each_proc_reloads_until_a_data_step_runs() {
    let request = Request {
        source: Some("employees.csv".into()),
        ..Request::new("PROC PRINT OBS=1; RUN; PROC MEANS; RUN;")
    };
    let response = run_request(&request).unwrap();
    let results = response.results();
    assert_eq!(results[0].message(), "PROC PRINT: showing 1 of 4 rows");
    assert_eq!(results[1].message(), "PROC MEANS: 3 numeric columns");
}

// ============================================================================
// Fatal Errors
// ============================================================================

#[test]
fn test_proc_without_dataset() {
    let err = run_err("PROC MEANS; RUN;");
    assert!(matches!(&err, FatalError::NoDataset { step } if step == "PROC MEANS"));
}

#[test]
fn test_unknown_data_option() {
    let err = run_err("DATA a; SET employees.csv; RUN; PROC PRINT DATA=b; RUN;");
    assert!(matches!(&err, FatalError::UnknownDataset(name) if name == "b"));
    assert_eq!(err.to_string(), "dataset 'b' is not defined");
}

#[test]
fn test_load_failures() {
    let test_cases = vec![
        ("DATA d; SET nowhere.csv; RUN;", "nowhere.csv"),
        ("DATA d; SET notes.txt; RUN;", "unsupported file type '.txt'"),
    ];

    for (code, expected) in test_cases {
        let err = run_err(code);
        assert!(matches!(err, FatalError::Load(_)), "Failed for input: {}", code);
        assert!(err.to_string().contains(expected), "Failed for input: {}", code);
    }
}

#[test]
fn test_syntax_and_plan_errors_are_fatal() {
    let err = run_err("DATA d;\n  SORT age;\nRUN;");
    assert!(matches!(err, FatalError::Syntax(_)));
    assert_eq!(
        err.to_string(),
        "syntax error at line 2, column 3: unknown statement 'SORT'"
    );

    let err = run_err("DATA d; KEEP age; RUN;");
    assert!(matches!(err, FatalError::Plan(PlanError::MissingSet { .. })));
}

#[test]
fn test_fatal_error_discards_earlier_results() {
    let err = run_err("DATA a; SET employees.csv; RUN; DATA b; SET gone.csv; RUN;");
    assert!(matches!(err, FatalError::Load(_)));
}

// ============================================================================
// JSON Requests
// ============================================================================

#[cfg(feature = "cli")]
#[test]
fn test_json_request_round_trip() {
    use datastep_lang::cli::execute_request;
    use std::path::PathBuf;

    let body = json!({
        "code": "DATA d; SET employees.csv; RUN; PROC FREQ; TABLES gender*age; RUN;",
        "output_format": "json",
    })
    .to_string();

    let response = execute_request(&Grammar::new(), &body, Some(&PathBuf::from(FIXTURES))).unwrap();
    let json = serde_json::to_value(response).unwrap();
    assert_eq!(json["results"][1]["crosstab"]["M"]["35"], json!(2));
    assert_eq!(json["results"][1]["crosstab"]["F"]["25"], json!(1));
}
