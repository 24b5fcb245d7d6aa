//! Documentation content for the datastep CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    DataStep,
    Where,
    Print,
    Means,
    Freq,
    Reg,
    Output,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" => Some(Self::Syntax),
            "data_step" | "data" | "set" | "keep" | "drop" | "rename" => Some(Self::DataStep),
            "where" | "filter" | "operators" => Some(Self::Where),
            "print" | "proc_print" => Some(Self::Print),
            "means" | "proc_means" => Some(Self::Means),
            "freq" | "proc_freq" | "tables" => Some(Self::Freq),
            "reg" | "proc_reg" | "model" | "plot" => Some(Self::Reg),
            "output" | "json" | "html" => Some(Self::Output),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"DATASTEP DOCUMENTATION

datastep runs small SAS-style scripts over CSV and spreadsheet files. A
script is a sequence of DATA steps, which load and reshape a dataset, and
PROC steps, which print, summarize, tabulate, or regress it.

DOCUMENTATION CATEGORIES

  syntax        Statements, blocks, comments, literals
  data-step     DATA, SET, KEEP, DROP, RENAME and the order they apply in
  where         WHERE filters and how values are compared
  print         PROC PRINT
  means         PROC MEANS
  freq          PROC FREQ one-way and two-way tables
  reg           PROC REG models and charts
  output        JSON and HTML results

QUICK REFERENCE

  DATA out; SET "file.csv"; WHERE age > 30; KEEP name age; RUN;
  PROC PRINT DATA=out OBS=10; VAR name; RUN;
  PROC MEANS; RUN;
  PROC FREQ; TABLES gender*age; RUN;
  PROC REG PLOTS; MODEL income = age; RUN;

Run 'datastep doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::DataStep) => Ok(DATA_STEP_DOC),
        Some(DocCategory::Where) => Ok(WHERE_DOC),
        Some(DocCategory::Print) => Ok(PRINT_DOC),
        Some(DocCategory::Means) => Ok(MEANS_DOC),
        Some(DocCategory::Freq) => Ok(FREQ_DOC),
        Some(DocCategory::Reg) => Ok(REG_DOC),
        Some(DocCategory::Output) => Ok(OUTPUT_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX - Statements and Blocks

STATEMENTS
  Every statement ends with a semicolon. Whitespace and line breaks are
  insignificant, so a statement may span several lines.

  Keywords are case-insensitive: DATA, data and Data are the same. Column
  names are case-sensitive.

BLOCKS
  DATA name; ... RUN;
  PROC PRINT|MEANS|FREQ|REG [options]; ... RUN;

    RUN; closes a block. QUIT; is accepted as well. A block without RUN;
    is closed by the next DATA or PROC statement, or by the end of the
    script.

COMMENTS
  /* anything, across lines */

LITERALS
  Numbers:  25   -3.5   1e6
  Strings:  "New York"   'O''Brien'   (a doubled quote escapes itself)

ERRORS
  A syntax error stops the script before any step runs and reports the
  line and column:

    syntax error at line 2, column 3: unknown statement 'SORT'
"#;

const DATA_STEP_DOC: &str = r#"DATA STEP - Loading and Reshaping

  DATA name;
    SET path [(sheet=name)];
    [WHERE column op value;]
    [KEEP col1 col2 ...;]
    [DROP col1 col2 ...;]
    [RENAME old=new ...;]
  RUN;

SET
  Loads a dataset. The path may be quoted or bare and may carry a path=
  prefix:

    SET "data/employees.csv";
    SET data/employees.csv;
    SET path="book.xlsx" (sheet=Q1);

  .csv files are read as CSV; .xls, .xlsx, .xlsm, .xlsb and .ods as
  spreadsheets (first sheet unless one is named). A bare name that
  matches an earlier DATA step reads that dataset instead of a file:

    DATA adults; SET "people.csv"; WHERE age >= 18; RUN;
    DATA names;  SET adults; KEEP name; RUN;

KEEP / DROP
  Column lists may be separated by spaces or commas. KEEP returns the
  listed columns in the listed order; unknown names are skipped. DROP
  removes listed columns; unknown names are ignored.

RENAME
  RENAME age=years income=salary;

  Pairs apply left to right. Unknown columns are ignored; a rename onto a
  name another column already has is skipped.

ORDER OF APPLICATION
  Clauses always apply as WHERE, then KEEP, then DROP, then RENAME,
  whatever order they are written in. So this is valid:

    DATA out; SET "people.csv";
      RENAME income=salary;
      KEEP income;
    RUN;

  and produces a single column named salary. Write each clause at most
  once per step; a repeated clause replaces the earlier one.

RESULT
  The step becomes the current dataset for following PROC steps and is
  registered under its name for DATA= and SET.
"#;

const WHERE_DOC: &str = r#"WHERE - Filtering Rows

  WHERE column op value;

OPERATORS
  =   EQ      equal
  !=  ^=  NE  not equal
  >   GT      greater than
  <   LT      less than
  >=  GE      greater than or equal
  <=  LE      less than or equal

COMPARISON RULES
  If the value parses as a number, the comparison is numeric:

    WHERE age > 30;
    WHERE zip = 02134;      compares the number 2134

  Otherwise the comparison is between strings:

    WHERE gender = F;
    WHERE city = "New York";

  Numeric comparison against a text column converts each cell; cells that
  are not numbers never match, except with !=.

  Missing cells match only != .

  A WHERE on a column the dataset does not have keeps every row.
"#;

const PRINT_DOC: &str = r#"PROC PRINT - Listing Rows

  PROC PRINT [DATA=name] [OBS=n];
    [VAR col1 col2 ...;]
    [OBS n;]
  RUN;

  VAR limits and orders the columns shown; unknown names are skipped.
  OBS caps the rows shown. Without OBS the request limit applies
  (default 50, --limit on the command line).

  The reported shape counts every row, not only those shown.

  Example:
    PROC PRINT; VAR name age; OBS 2; RUN;
"#;

const MEANS_DOC: &str = r#"PROC MEANS - Summary Statistics

  PROC MEANS [DATA=name];
    [VAR col1 col2 ...;]
  RUN;

  Summarizes numeric columns (all of them, or those named in VAR):

    n      count of non-missing values
    mean   arithmetic mean
    std    sample standard deviation (n - 1)
    min    smallest value
    max    largest value

  Missing cells are skipped. A statistic that cannot be computed, such as
  std of a single value, is null.
"#;

const FREQ_DOC: &str = r#"PROC FREQ - Frequency Tables

  PROC FREQ [DATA=name];
    [TABLES a;]
    [TABLES a*b;]
  RUN;

ONE-WAY
  Without TABLES every column is counted. With one column:

    {"frequencies": {"gender": {"F": 2, "M": 2}}}

  A column the dataset does not have gives an empty table. Missing cells
  are counted under "." .

TWO-WAY
  TABLES gender*age; (or "gender age", or "gender, age") gives a
  crosstab keyed by the first column, then the second:

    {"crosstab": {"F": {"25": 1, "35": 0, "41": 1}, "M": {...}}}

  Every combination appears, with 0 where no rows match.

LIMITS
  More than two columns is an error for the step:
    Only 1 or 2 columns supported in TABLES
"#;

const REG_DOC: &str = r#"PROC REG - Linear Regression

  PROC REG [DATA=name] [PLOTS];
    MODEL dependent = independent1 independent2 ...;
    [PLOT y*x;]
  RUN;

MODEL
  Fits ordinary least squares with an intercept (named const). Rows with
  a missing value in any model column are left out.

  Independent columns that are not numeric are left out of the model. The
  dependent column must be numeric.

  Result:
    coefficients   estimate per term
    pvalues        two-sided t-test p-value per term
    rsquared       coefficient of determination
    nobs           rows used

  A dependent or independent column the dataset does not have is an error
  for the step.

CHARTS
  PLOT y*x; draws y against x with the fitted line for that pair.
  PLOTS on the PROC line, or --plot on the command line, draws the
  dependent against the first numeric independent.

  The chart is a PNG, base64-encoded in chart_png_base64. When a named
  column cannot be plotted, chart_error says why.
"#;

const OUTPUT_DOC: &str = r#"OUTPUT - Results

  Each step produces one result object. A script with one step returns
  that object; otherwise:

    {"steps": 3, "results": [ ... ]}

FORMATS
  --format json (default)
    DATA steps include a preview of the first 5 rows. PROC PRINT includes
    the rows shown as objects keyed by column.

  --format html
    Tables are returned as HTML in an "html" field instead.

ERRORS
  Problems inside a PROC step are reported in that step's result and the
  script continues:

    {"message": "PROC REG failed",
     "error": "Dependent variable 'salary' not found"}

  Syntax errors, invalid steps, unreadable files, and PROC steps with no
  dataset stop the script and exit with status 1.

REQUESTS
  datastep request reads a JSON request:

    {"code": "PROC MEANS; RUN;", "output_format": "json",
     "limit": 50, "plot": false, "source": "employees.csv"}

  source names a dataset to load when a PROC step runs before any DATA
  step.
"#;
