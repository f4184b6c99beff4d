use crate::infra::build_monitor;
use clap::Args;
use reservation_watch::checker::{Availability, AvailabilityChecker, ParkPageChecker};
use reservation_watch::config::{AppConfig, SourceConfig, TelemetryConfig};
use reservation_watch::domain::MONTHS;
use reservation_watch::error::AppError;
use reservation_watch::monitor::{MonitorError, PollSummary};
use reservation_watch::telemetry;

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Month to look for on the reservation page (e.g. February)
    #[arg(long, value_parser = parse_month)]
    pub(crate) month: String,
}

/// Accepts any non-blank month, normalizing known month names to title case.
pub(crate) fn parse_month(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("month must not be empty".to_string());
    }

    Ok(MONTHS
        .iter()
        .find(|month| month.eq_ignore_ascii_case(trimmed))
        .map(|month| month.to_string())
        .unwrap_or_else(|| trimmed.to_string()))
}

pub(crate) async fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let source = SourceConfig::load()?;
    telemetry::init(&TelemetryConfig::from_env())?;

    let checker = ParkPageChecker::new(&source)?;
    let availability = checker
        .check(&args.month)
        .await
        .map_err(MonitorError::from)?;

    print!("{}", render_check(&args.month, checker.page_url(), &availability));
    Ok(())
}

pub(crate) async fn run_poll_once() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let monitor = build_monitor(&config).await?;
    let summary = monitor.poll_once().await;

    print!("{}", render_summary(&summary));
    Ok(())
}

pub(crate) fn render_check(month: &str, page_url: &str, availability: &Availability) -> String {
    let mut output = format!("Reservation check for {month}\nSource: {page_url}\n");
    match availability {
        Availability::Found(dates) => {
            output.push_str("Reservation dates found:\n");
            for date in dates {
                output.push_str(&format!("- {date}\n"));
            }
        }
        Availability::NotFound => output.push_str("No reservation dates found\n"),
    }
    output
}

pub(crate) fn render_summary(summary: &PollSummary) -> String {
    format!(
        "Poll complete\n\
         - examined: {}\n\
         - notified: {}\n\
         - notification failures: {}\n\
         - no match: {}\n\
         - errors: {}\n",
        summary.examined,
        summary.notified,
        summary.notification_failures,
        summary.no_match,
        summary.failed
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_argument_is_normalized() {
        assert_eq!(parse_month(" february ").as_deref(), Ok("February"));
        assert_eq!(parse_month("Spring").as_deref(), Ok("Spring"));
        assert!(parse_month("   ").is_err());
    }

    #[test]
    fn check_output_lists_dates() {
        let availability = Availability::Found(vec![
            "February 8–9".to_string(),
            "February 15–17".to_string(),
        ]);

        let output = render_check("February", "https://example.com", &availability);

        assert!(output.starts_with("Reservation check for February\n"));
        assert!(output.contains("- February 8–9\n- February 15–17\n"));
        assert!(render_check("May", "https://example.com", &Availability::NotFound)
            .ends_with("No reservation dates found\n"));
    }

    #[test]
    fn summary_output_reports_every_counter() {
        let output = render_summary(&PollSummary {
            examined: 4,
            notified: 1,
            notification_failures: 1,
            no_match: 1,
            failed: 1,
        });

        assert!(output.contains("- examined: 4\n"));
        assert!(output.contains("- notification failures: 1\n"));
        assert!(output.contains("- errors: 1\n"));
    }
}
