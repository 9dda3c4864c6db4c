use std::io::{self, BufRead, Write};

use crate::api::events::Toast;
use crate::api::models::CountryOption;
use crate::auth::{AuthFlow, AuthState, Pending, PendingAction};
use crate::error::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    SignedIn,
    Quit,
}

pub fn show_login<R: BufRead, W: Write>(
    flow: &mut AuthFlow,
    countries: &[CountryOption],
    input: &mut R,
    out: &mut W,
) -> io::Result<LoginOutcome> {
    writeln!(out, "Welcome")?;
    writeln!(out, "Sign in to continue to your AI assistant")?;
    writeln!(out, "(:code <+NN|country>, :countries [filter], :change, :quit)")?;

    while !flow.is_authenticated() {
        let session = flow.session();
        match session.state() {
            AuthState::AwaitingOtp => {
                let label = format!("Enter OTP sent to {}: ", session.phone().display());
                super::prompt(out, &label)?;
            }
            _ => {
                let label = format!("Phone number [{}]: ", session.phone().calling_code());
                super::prompt(out, &label)?;
            }
        }

        let Some(line) = super::read_line(input)? else {
            return Ok(LoginOutcome::Quit);
        };
        if line == ":quit" {
            return Ok(LoginOutcome::Quit);
        }

        let attempt = match flow.state() {
            AuthState::CollectingPhone => on_phone_line(flow, countries, &line, out)?,
            AuthState::AwaitingOtp => on_otp_line(flow, &line, out)?,
            _ => Ok(None),
        };
        match attempt {
            Ok(Some(pending)) => settle(flow, pending, out)?,
            Ok(None) => {}
            Err(AuthError::Validation(_)) => {
                writeln!(out, "{}", flow.session().error_message())?;
            }
            Err(e) => log::warn!("login: {e}"),
        }
    }
    Ok(LoginOutcome::SignedIn)
}

fn on_phone_line<W: Write>(
    flow: &mut AuthFlow,
    countries: &[CountryOption],
    line: &str,
    out: &mut W,
) -> io::Result<Result<Option<Pending>, AuthError>> {
    if let Some(arg) = line.strip_prefix(":code") {
        let arg = arg.trim();
        let code = if arg.starts_with('+') {
            Some(arg.to_string())
        } else {
            find_country(countries, arg).map(|c| c.calling_code.clone())
        };
        return match code {
            Some(code) => Ok(flow.select_calling_code(&code).map(|_| None)),
            None => {
                writeln!(out, "Unknown country: {arg}")?;
                Ok(Ok(None))
            }
        };
    }
    if let Some(filter) = line.strip_prefix(":countries") {
        list_countries(countries, filter.trim(), out)?;
        return Ok(Ok(None));
    }
    if line.starts_with(':') {
        writeln!(out, "Unknown command: {line}")?;
        return Ok(Ok(None));
    }
    Ok(flow.set_phone_input(line).and_then(|_| flow.submit_phone()))
}

fn on_otp_line<W: Write>(
    flow: &mut AuthFlow,
    line: &str,
    out: &mut W,
) -> io::Result<Result<Option<Pending>, AuthError>> {
    if line == ":change" {
        return Ok(flow.change_phone_number().map(|_| None));
    }
    if line.starts_with(':') {
        writeln!(out, "Unknown command: {line}")?;
        return Ok(Ok(None));
    }
    Ok(flow.set_otp_input(line).and_then(|_| flow.submit_otp()))
}

fn settle<W: Write>(flow: &mut AuthFlow, pending: Pending, out: &mut W) -> io::Result<()> {
    let busy_label = match pending.ticket().action() {
        PendingAction::SendOtp => "Sending...",
        PendingAction::VerifyOtp => "Verifying...",
    };
    writeln!(out, "{busy_label}")?;
    let ticket = pending.ticket();
    match crate::utils::run_async_to_main(pending.settle()).blocking_recv() {
        Ok(settled) => {
            if let Some(signal) = flow.complete(settled) {
                super::print_toast(out, &signal.toast())?;
            }
        }
        Err(_) => {
            log::warn!("login: submission dropped before completing");
            flow.cancel(ticket);
            super::print_toast(out, &Toast::error("Something went wrong, please try again"))?;
        }
    }
    Ok(())
}

fn find_country<'a>(countries: &'a [CountryOption], name: &str) -> Option<&'a CountryOption> {
    let needle = name.to_lowercase();
    if needle.is_empty() {
        return None;
    }
    countries
        .iter()
        .find(|c| c.display_name.to_lowercase() == needle)
        .or_else(|| {
            countries
                .iter()
                .find(|c| c.display_name.to_lowercase().starts_with(&needle))
        })
}

fn list_countries<W: Write>(countries: &[CountryOption], filter: &str, out: &mut W) -> io::Result<()> {
    if countries.is_empty() {
        return writeln!(out, "No countries loaded; type a code like :code +44");
    }
    let filter = filter.to_lowercase();
    for c in countries
        .iter()
        .filter(|c| c.display_name.to_lowercase().contains(&filter))
    {
        writeln!(out, "  {:<32} {}", c.display_name, c.calling_code)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SubmitDelays;
    use std::time::Duration;

    fn instant_flow() -> AuthFlow {
        AuthFlow::new(
            "+1",
            SubmitDelays {
                send_otp: Duration::ZERO,
                verify_otp: Duration::ZERO,
            },
        )
    }

    fn countries() -> Vec<CountryOption> {
        vec![CountryOption {
            display_name: "Germany".into(),
            calling_code: "+49".into(),
            iso_code: Some("DE".into()),
            flag_url: None,
        }]
    }

    fn run(script: &str) -> (AuthFlow, LoginOutcome, String) {
        let mut flow = instant_flow();
        let mut input = script.as_bytes();
        let mut out = Vec::new();
        let outcome = show_login(&mut flow, &countries(), &mut input, &mut out).unwrap();
        (flow, outcome, String::from_utf8(out).unwrap())
    }

    #[test]
    fn full_sign_in() {
        let (flow, outcome, screen) = run(":code germany\n555 1234\n123456\n");
        assert_eq!(outcome, LoginOutcome::SignedIn);
        assert!(flow.is_authenticated());
        assert!(screen.contains("Enter OTP sent to +49 5551234"));
        assert!(screen.contains("[ok] OTP sent successfully!"));
        assert!(screen.contains("[ok] Login successful!"));
    }

    #[test]
    fn validation_messages_are_shown_and_retry_works() {
        let (flow, outcome, screen) = run("123\n1234567\n12\n:change\n");
        assert_eq!(outcome, LoginOutcome::Quit);
        assert_eq!(flow.state(), AuthState::CollectingPhone);
        assert!(screen.contains("Please enter a valid phone number"));
        assert!(screen.contains("Please enter a valid 6-digit OTP"));
        assert_eq!(flow.session().otp().as_str(), "");
    }

    #[test]
    fn unknown_country_keeps_default_code() {
        let (flow, outcome, screen) = run(":code atlantis\n:quit\n");
        assert_eq!(outcome, LoginOutcome::Quit);
        assert!(screen.contains("Unknown country: atlantis"));
        assert_eq!(flow.session().phone().calling_code(), "+1");
    }

    #[test]
    fn commands_on_otp_screen_are_not_taken_as_codes() {
        let (flow, outcome, screen) = run("5551234
:code +44
:quit
");
        assert_eq!(outcome, LoginOutcome::Quit);
        assert_eq!(flow.state(), AuthState::AwaitingOtp);
        assert!(screen.contains("Unknown command: :code +44"));
        assert!(!screen.contains("Please enter a valid 6-digit OTP"));
        assert_eq!(flow.session().error_message(), "");
    }
}
