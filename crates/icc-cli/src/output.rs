//! Rendering of driver results.

use std::io::Write;

use icc_driver::IccResult;

use crate::cli::OutputFormat;
use crate::errors::AppError;

/// Writes `result` in the requested format.
///
/// Human output puts data lines on `stdout` so they can be piped, and the
/// driver's status line on `stderr`.
pub(crate) fn render_result<W, E>(
    result: &IccResult,
    format: OutputFormat,
    stdout: &mut W,
    stderr: &mut E,
) -> Result<(), AppError>
where
    W: Write,
    E: Write,
{
    match format {
        OutputFormat::Human => {
            for line in result.data() {
                writeln!(stdout, "{line}").map_err(AppError::WriteOutput)?;
            }
            writeln!(stderr, "{}", result.message()).map_err(AppError::WriteOutput)
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *stdout, result).map_err(AppError::SerialiseResult)?;
            writeln!(stdout).map_err(AppError::WriteOutput)
        }
    }
}

#[cfg(test)]
mod tests {
    use icc_driver::StatusCode;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn result() -> IccResult {
        IccResult::new(
            vec![String::from("PARAM1=10"), String::from("PARAM2=20")],
            vec![String::from("DONE 0")],
            String::from("DONE 0"),
            StatusCode::Success,
        )
    }

    #[rstest]
    fn human_output_splits_data_and_status(result: IccResult) {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        render_result(&result, OutputFormat::Human, &mut stdout, &mut stderr).expect("render");

        assert_eq!(String::from_utf8(stdout).expect("utf8"), "PARAM1=10\nPARAM2=20\n");
        assert_eq!(String::from_utf8(stderr).expect("utf8"), "DONE 0\n");
    }

    #[rstest]
    fn json_output_serialises_the_result(result: IccResult) {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        render_result(&result, OutputFormat::Json, &mut stdout, &mut stderr).expect("render");

        let value: serde_json::Value = serde_json::from_slice(&stdout).expect("json");
        assert_eq!(value["data"], serde_json::json!(["PARAM1=10", "PARAM2=20"]));
        assert_eq!(value["status"], 0);
        assert!(stderr.is_empty());
    }
}
