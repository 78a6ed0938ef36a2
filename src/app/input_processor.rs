//! Profile id collection: positional argument, piped stdin, or interactive prompt.

use std::io::{self, BufRead, IsTerminal, Read, Write};

use anyhow::{Context, Result, bail};
use screenshot_downloader::ProfileId;

/// Resolves the profile to download from the argument, stdin or a prompt.
///
/// Non-interactive input that does not parse is an error. Interactive input
/// is asked for again until it parses.
pub(crate) fn resolve_profile(arg: Option<&str>) -> Result<ProfileId> {
    if let Some(raw) = arg {
        return raw
            .parse()
            .with_context(|| format!("'{raw}' is not a valid profile id"));
    }

    let stdin = io::stdin();
    if !stdin.is_terminal() {
        let mut buffer = String::new();
        stdin.lock().read_to_string(&mut buffer)?;
        return profile_from_piped_input(&buffer);
    }

    prompt_for_profile(&mut stdin.lock(), &mut io::stdout())
}

/// Takes the first non-blank line of piped input.
fn profile_from_piped_input(input: &str) -> Result<ProfileId> {
    let Some(line) = input.lines().map(str::trim).find(|line| !line.is_empty()) else {
        bail!("no profile id given: pass one as an argument or pipe it on stdin");
    };
    line.parse()
        .with_context(|| format!("'{line}' is not a valid profile id"))
}

fn prompt_for_profile(input: &mut impl BufRead, output: &mut impl Write) -> Result<ProfileId> {
    writeln!(output, "Your profile id is a long number, usually starting with 7.. ie 76561197960279927")?;
    loop {
        writeln!(output)?;
        writeln!(output, "Please type your profile id:")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("no profile id given");
        }

        match line.parse::<ProfileId>() {
            Ok(profile) => return Ok(profile),
            Err(_) => writeln!(output, "That doesn't look right.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_resolve_profile_from_argument() {
        let profile = resolve_profile(Some("76561197960279927")).unwrap();
        assert_eq!(profile.get(), 76_561_197_960_279_927);
    }

    #[test]
    fn test_resolve_profile_rejects_bad_argument() {
        let err = resolve_profile(Some("gaben")).unwrap_err();
        assert!(err.to_string().contains("gaben"));
    }

    #[test]
    fn test_piped_input_takes_first_non_blank_line() {
        let profile = profile_from_piped_input("\n  \n 123 \n456\n").unwrap();
        assert_eq!(profile.get(), 123);
    }

    #[test]
    fn test_piped_input_empty_is_error() {
        assert!(profile_from_piped_input("   \n").is_err());
    }

    #[test]
    fn test_prompt_asks_again_until_valid() {
        let mut input = Cursor::new("nope\n\n42\n");
        let mut output = Vec::new();

        let profile = prompt_for_profile(&mut input, &mut output).unwrap();

        assert_eq!(profile.get(), 42);
        let printed = String::from_utf8(output).unwrap();
        assert_eq!(printed.matches("That doesn't look right.").count(), 2);
    }

    #[test]
    fn test_prompt_end_of_input_is_error() {
        let mut input = Cursor::new("nope\n");
        let mut output = Vec::new();
        assert!(prompt_for_profile(&mut input, &mut output).is_err());
    }
}
