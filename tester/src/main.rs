use std::{
    fs::File,
    io::{self, BufRead},
    path::Path,
    process::{exit, Command},
};

use clap::Parser;
use console::{style, Term};
use glob::glob;
use regex::Regex;

/// Runs the sample descriptor files against the astgen binary.
#[derive(Debug, Parser)]
struct Args {
    /// Only run samples whose path (relative to the samples directory) starts with this.
    filter: Option<String>,

    #[arg(long, default_value = "./target/release/astgen-cli")]
    binary: String,

    #[arg(long, default_value = "samples")]
    samples: String,
}

struct ExpectedOutput {
    line: usize,
    output: String,
}

impl ExpectedOutput {
    pub fn new(line: usize, output: String) -> Self {
        ExpectedOutput { line, output }
    }
}

struct Test {
    path: String,
    args: Vec<String>,
    expected_output: Vec<ExpectedOutput>,
    expected_error: Option<String>,
    expected_exit_code: i32,
    expectations: u32,
}

impl Test {
    fn new(path: String) -> Self {
        Test {
            path,
            args: Vec::new(),
            expected_output: Vec::new(),
            expected_error: None,
            expected_exit_code: 0,
            expectations: 0,
        }
    }

    fn parse(&mut self) -> bool {
        let expected_output_pattern = Regex::new(r"^\s*// expect: ?(.*)$").unwrap();
        let expected_error_pattern = Regex::new(r"^\s*// expect error: (.+)$").unwrap();
        let args_pattern = Regex::new(r"^\s*// args: (.+)$").unwrap();
        let non_test_pattern = Regex::new(r"// nontest").unwrap();

        let lines = match read_lines(&self.path) {
            Ok(lines) => lines,
            Err(err) => {
                println!(
                    "{}: {}\n\t{}",
                    style("TEST ERROR").magenta(),
                    self.path,
                    style(err).red()
                );
                return false;
            }
        };

        for (line_num, line) in lines.flatten().enumerate() {
            // Not a test file at all, so ignore it.
            if non_test_pattern.is_match(&line) {
                return false;
            }

            if let Some(output) = capture(&expected_output_pattern, &line) {
                self.expected_output
                    .push(ExpectedOutput::new(line_num + 1, output));
                self.expectations += 1;
                continue;
            }

            if let Some(error) = capture(&expected_error_pattern, &line) {
                if self.expected_error.is_some() {
                    println!(
                        "{}: {}\n\t{}",
                        style("TEST ERROR").magenta(),
                        self.path,
                        style("Only one expected error per test.").red()
                    );
                    return false;
                }
                self.expected_error = Some(error);
                self.expected_exit_code = 65;
                self.expectations += 1;
                continue;
            }

            if let Some(args) = capture(&args_pattern, &line) {
                self.args
                    .extend(args.split_whitespace().map(str::to_string));
            }
        }

        if self.expected_error.is_some() && !self.expected_output.is_empty() {
            // Errors are reported before anything is emitted.
            println!(
                "{}: {}\n\t{}",
                style("TEST ERROR").magenta(),
                self.path,
                style("Cannot expect both output and an error.").red()
            );
            return false;
        }

        true
    }

    fn run(&mut self, binary: &str) -> Vec<String> {
        let mut failures = Vec::new();

        let result = match Command::new(binary)
            .arg("--descriptors")
            .arg(&self.path)
            .args(&self.args)
            .output()
        {
            Ok(result) => result,
            Err(err) => {
                failures.push(format!("Failed to run '{}': {}", binary, err));
                return failures;
            }
        };

        // Validate errors
        let error_lines: Vec<String> = result.stderr.lines().map_while(Result::ok).collect();
        match &self.expected_error {
            Some(expected) => match error_lines.first() {
                Some(error) if error == expected => {}
                Some(error) => failures.push(format!(
                    "Expected error '{}' and got:\n{}",
                    expected, error
                )),
                None => failures.push(format!("Missing expected error: {}", expected)),
            },
            None => {
                for line in error_lines.iter().take(10) {
                    failures.push(format!("Unexpected output on stderr: {}", line));
                }
            }
        }

        // Validate exit code
        let exit_code = result.status.code();
        if exit_code != Some(self.expected_exit_code) {
            failures.push(format!(
                "Expected return code {} and got {:?}.",
                self.expected_exit_code, exit_code
            ));
        }

        // Validate output, skipping the banner and the empty line after it
        let mut output_lines: Vec<String> = result.stdout.lines().map_while(Result::ok).collect();
        if output_lines
            .first()
            .map_or(false, |line| line.starts_with("Generating '"))
        {
            output_lines.drain(..output_lines.len().min(2));
        } else {
            failures.push("Missing banner on stdout.".to_string());
        }

        let mut index = 0;
        while index < output_lines.len() {
            let line = &output_lines[index];
            match self.expected_output.get(index) {
                None => failures.push(format!("Got output '{}' when none was expected.", line)),
                Some(expected) if &expected.output != line => failures.push(format!(
                    "Expected output '{}' on line {} and got '{}'.",
                    expected.output, expected.line, line
                )),
                Some(_) => {}
            }
            index += 1;
        }

        while index < self.expected_output.len() {
            let expected = &self.expected_output[index];
            failures.push(format!(
                "Missing expected output '{}' on line {}.",
                expected.output, expected.line
            ));
            index += 1;
        }

        failures
    }
}

struct Tester {
    binary: String,
    samples: String,
    filter_path: Option<String>,
    passed: u32,
    failed: u32,
    skipped: u32,
    expectations: u32,
}

impl Tester {
    fn new(args: Args) -> Self {
        Tester {
            binary: args.binary,
            samples: args.samples,
            filter_path: args.filter,
            passed: 0,
            failed: 0,
            skipped: 0,
            expectations: 0,
        }
    }

    fn run_suite(&mut self) -> io::Result<bool> {
        let term = Term::stdout();
        term.write_line("")?;

        let pattern = format!("{}/**/*.ast", self.samples);
        let paths = glob(&pattern).map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
        for path in paths.flatten() {
            if let Some(path) = path.to_str() {
                self.run_test(&term, path)?;
            }
        }

        term.clear_last_lines(1)?;

        if self.failed == 0 {
            println!(
                "All {} tests passed ({} expectations).",
                style(self.passed).green(),
                self.expectations
            );
        } else {
            println!(
                "{} tests passed. {} tests failed.",
                style(self.passed).green(),
                style(self.failed).red()
            );
        }

        Ok(self.failed == 0)
    }

    fn run_test(&mut self, term: &Term, path: &str) -> io::Result<()> {
        // Check if we are just running a subset of the tests.
        if let Some(filter_path) = &self.filter_path {
            let test_path = pathdiff::diff_paths(path, &self.samples)
                .and_then(|relative| relative.to_str().map(str::to_string))
                .unwrap_or_default();
            if !test_path.starts_with(filter_path.as_str()) {
                return Ok(());
            }
        }

        term.clear_last_lines(1)?;
        term.write_line(&format!(
            "Passed: {} Failed: {} Skipped: {} ({})",
            style(self.passed).green(),
            style(self.failed).red(),
            style(self.skipped).yellow(),
            style(path)
        ))?;

        let mut test = Test::new(path.to_string());
        if !test.parse() {
            self.skipped += 1;
            return Ok(());
        }
        self.expectations += test.expectations;

        let failures = test.run(&self.binary);
        if failures.is_empty() {
            self.passed += 1;
        } else {
            self.failed += 1;
            println!("{}: {}", style("FAIL").red(), path);
            println!();
            for failure in &failures {
                println!("\t{}", style(failure).blue());
            }
            println!();
            term.write_line("")?;
        }

        Ok(())
    }
}

fn main() -> io::Result<()> {
    let mut tester = Tester::new(Args::parse());
    if !tester.run_suite()? {
        exit(1);
    }

    Ok(())
}

fn capture(pattern: &Regex, line: &str) -> Option<String> {
    pattern
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|matched| matched.as_str().to_string())
}

// The output is wrapped in a Result to allow matching on errors
// Returns an Iterator to the Reader of the lines of the file.
fn read_lines<P>(filename: P) -> io::Result<io::Lines<io::BufReader<File>>>
where
    P: AsRef<Path>,
{
    let file = File::open(filename)?;
    Ok(io::BufReader::new(file).lines())
}
