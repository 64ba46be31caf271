//! Line-oriented calculator session.
//!
//! Each line `<age> <sex> <t_stage> <lnr>` re-runs the whole pipeline, the
//! way the form re-evaluates on every change. Bad lines are reported and
//! the session continues.

use std::io::{BufRead, Write};

use gbcmet_core::{Explainer, PatientInput, ProbabilityModel, RiskPipeline};

use crate::display;

const PROMPT: &str = "gbcmet> ";
const USAGE: &str = "enter: <age 18-100> <Male|Female> <T1-T4> <lnr 0-1>, or `quit`";

pub fn run<M, R, W>(
    pipeline: &RiskPipeline<'_, M>,
    explain: bool,
    input: R,
    mut out: W,
) -> anyhow::Result<usize>
where
    M: ProbabilityModel + Explainer + ?Sized,
    R: BufRead,
    W: Write,
{
    writeln!(out, "{}", display::TITLE)?;
    writeln!(out, "{USAGE}")?;
    write!(out, "{PROMPT}")?;
    out.flush()?;

    let mut assessed = 0;
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        match line {
            "" => {}
            "quit" | "exit" => break,
            "help" => writeln!(out, "{USAGE}")?,
            _ => match parse_line(line) {
                Ok(patient) => {
                    let result = if explain {
                        pipeline.assess_with_explanation(&patient)
                    } else {
                        pipeline.assess(&patient)
                    };
                    match result {
                        Ok(assessment) => {
                            write!(out, "{}", display::render_assessment(&assessment)?)?;
                            assessed += 1;
                        }
                        Err(e) => writeln!(out, "error: {e}")?,
                    }
                }
                Err(msg) => writeln!(out, "error: {msg}\n{USAGE}")?,
            },
        }
        write!(out, "{PROMPT}")?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(assessed)
}

fn parse_line(line: &str) -> Result<PatientInput, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let &[age, sex, t_stage, lnr] = fields.as_slice() else {
        return Err(format!("expected 4 values, got {}", fields.len()));
    };
    let age: i64 = age.parse().map_err(|_| format!("age {age:?} is not a whole number"))?;
    let lnr: f64 = lnr.parse().map_err(|_| format!("lnr {lnr:?} is not a number"))?;
    Ok(PatientInput::new(age, sex, t_stage, lnr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbcmet_core::{ExplainError, Explanation, FeatureVector, InferenceError};
    use std::cell::Cell;
    use std::io::Cursor;

    struct Counting {
        calls: Cell<usize>,
    }

    impl ProbabilityModel for Counting {
        fn predict_probability(&self, x: &FeatureVector) -> Result<f64, InferenceError> {
            self.calls.set(self.calls.get() + 1);
            Ok(x.lnr())
        }
    }

    impl Explainer for Counting {
        fn explain(&self, _: &FeatureVector) -> Result<Explanation, ExplainError> {
            Err(ExplainError::Unsupported("test model".into()))
        }
    }

    fn session(script: &str, explain: bool) -> (usize, usize, String) {
        let model = Counting {
            calls: Cell::new(0),
        };
        let pipeline = RiskPipeline::new(&model);
        let mut out = Vec::new();
        let n = run(&pipeline, explain, Cursor::new(script), &mut out).unwrap();
        (n, model.calls.get(), String::from_utf8(out).unwrap())
    }

    #[test]
    fn each_line_is_assessed() {
        let (n, calls, out) = session("65 Female T2 0.30\n65 Female T2 0.60\nquit\n", false);
        assert_eq!(n, 2);
        assert_eq!(calls, 2);
        assert!(out.contains("30.00%"));
        assert!(out.contains("Low Risk"));
        assert!(out.contains("60.00%"));
        assert!(out.contains("High Risk"));
    }

    #[test]
    fn bad_lines_do_not_reach_the_model() {
        let (n, calls, out) = session("65 Female\n17 Male T1 0.1\n65 Male T7 0.1\nabc Male T1 0.1\n", false);
        assert_eq!(n, 0);
        assert_eq!(calls, 0);
        assert!(out.contains("expected 4 values, got 2"));
        assert!(out.contains("age 17 is outside 18..=100"));
        assert!(out.contains("unrecognised T stage"));
        assert!(out.contains("is not a whole number"));
    }

    #[test]
    fn quit_stops_reading() {
        let (n, _, _) = session("quit\n65 Female T2 0.30\n", false);
        assert_eq!(n, 0);
    }

    #[test]
    fn explanation_failure_still_reports_risk() {
        let (n, _, out) = session("70 Male T3 0.8\n", true);
        assert_eq!(n, 1);
        assert!(out.contains("80.00%"));
        assert!(out.contains("warning: attribution unavailable"));
    }

    #[test]
    fn parse_line_fields() {
        let p = parse_line("  65   Female  T2 0.10 ").unwrap();
        assert_eq!(p, PatientInput::new(65, "Female", "T2", 0.10));
    }
}
