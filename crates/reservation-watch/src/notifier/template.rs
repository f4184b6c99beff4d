use std::fmt::Write as _;

use crate::markup::escape_html;

/// Content of the email sent when reservation dates are detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationNotice<'a> {
    pub month: &'a str,
    pub dates: &'a [String],
    pub source_url: &'a str,
}

impl ReservationNotice<'_> {
    pub fn subject(&self) -> String {
        format!(
            "Important: Entry Reservation Requirements at Yosemite for {}",
            self.month
        )
    }

    pub fn html_body(&self) -> String {
        let month = escape_html(self.month);
        let source_url = escape_html(self.source_url);
        let mut html = String::new();

        html.push_str(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;\">\n",
        );
        html.push_str(
            "<h1 style=\"color: #2c5530; font-size: 24px; margin-bottom: 20px;\">Entry Reservation Requirements Detected</h1>\n",
        );
        writeln!(
            html,
            "<p style=\"font-size: 16px; margin-bottom: 20px;\">A reservation is required to drive into Yosemite 24 hours per day for visitors arriving during these dates in {month}:</p>"
        )
        .expect("write intro");

        html.push_str(
            "<div style=\"background: #f5f5f5; padding: 15px; border-radius: 5px; margin: 20px 0;\">\n<ul style=\"list-style-type: none; padding: 0; margin: 0;\">\n",
        );
        for date in self.dates {
            writeln!(
                html,
                "<li style=\"margin: 10px 0; padding-left: 20px;\">&bull; {}</li>",
                escape_html(date)
            )
            .expect("write date");
        }
        html.push_str("</ul>\n</div>\n");

        writeln!(
            html,
            "<p style=\"margin: 20px 0;\"><a href=\"{source_url}\" style=\"color: #2c5530; text-decoration: underline;\">View full details and make reservations on the Yosemite website</a></p>"
        )
        .expect("write link");
        html.push_str(
            "<p style=\"color: #666; font-size: 14px; font-style: italic;\">Note: Requirements may change. Always verify information on the official website.</p>\n</div>\n",
        );

        html
    }

    pub fn text_body(&self) -> String {
        let mut text = String::new();
        writeln!(
            text,
            "A reservation is required to drive into Yosemite 24 hours per day for visitors arriving during these dates in {}:",
            self.month
        )
        .expect("write intro");
        text.push('\n');
        for date in self.dates {
            writeln!(text, "  - {date}").expect("write date");
        }
        text.push('\n');
        writeln!(
            text,
            "View full details and make reservations: {}",
            self.source_url
        )
        .expect("write link");
        text.push_str("Note: Requirements may change. Always verify information on the official website.\n");
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice<'a>(dates: &'a [String]) -> ReservationNotice<'a> {
        ReservationNotice {
            month: "February",
            dates,
            source_url: "https://www.nps.gov/yose/planyourvisit/reservations.htm",
        }
    }

    #[test]
    fn subject_names_the_month() {
        assert_eq!(
            notice(&[]).subject(),
            "Important: Entry Reservation Requirements at Yosemite for February"
        );
    }

    #[test]
    fn html_lists_each_date_and_links_the_source() {
        let dates = vec!["February 8–9".to_string(), "February 15–17".to_string()];
        let html = notice(&dates).html_body();

        assert_eq!(html.matches("<li ").count(), 2);
        assert!(html.contains("&bull; February 8–9</li>"));
        assert!(html.contains("&bull; February 15–17</li>"));
        assert!(html.contains("during these dates in February:"));
        assert!(html.contains(
            "href=\"https://www.nps.gov/yose/planyourvisit/reservations.htm\""
        ));
    }

    #[test]
    fn html_escapes_page_text() {
        let dates = vec!["February 8<script>".to_string()];
        let html = notice(&dates).html_body();

        assert!(html.contains("February 8&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn text_body_mirrors_html_content() {
        let dates = vec!["February 22–23".to_string()];
        let text = notice(&dates).text_body();

        assert!(text.contains("  - February 22–23\n"));
        assert!(text.contains("reservations.htm"));
    }
}
