use declarative::CommandOutput;
use std::io;
use std::process::Command;

/// Run a command line and capture its output
pub fn run_output(command: &[String]) -> io::Result<CommandOutput> {
    let Some((program, args)) = command.split_first() else {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty command line"));
    };
    log::debug!("Running: {}", command.join(" "));
    Ok(Command::new(program).args(args).output()?.into())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn cmd(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_run_output_captures_stdout() {
        let output = run_output(&cmd(&["echo", "hello"])).unwrap();
        assert!(output.success);
        assert_eq!(output.stdout_str().trim(), "hello");
    }

    #[test]
    fn test_run_output_reports_exit_status() {
        assert!(!run_output(&cmd(&["false"])).unwrap().success);
    }

    #[test]
    fn test_run_output_missing_program_is_error() {
        let err = run_output(&cmd(&["agentplug-no-such-program"])).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_run_output_empty_command_is_error() {
        let err = run_output(&[]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
