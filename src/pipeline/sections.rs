use serde::{Deserialize, Serialize};
use tracing::warn;

/// Heading tokens expected in the analysis response, in priority order.
pub const SENTIMENT_HEADING: &str = "Sentiment Analysis";
pub const INSIGHTS_HEADING: &str = "Insights";
pub const EMAIL_HEADING: &str = "Email Response";

/// Normalized marker substituted for improperly-encoded bullet glyphs.
const BULLET_MARKER: &str = "* ";

/// The three-part decomposition of one analysis response.
///
/// Sections are non-overlapping and together cover the whole normalized
/// response; each keeps its own heading text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredSections {
    pub sentiment_analysis: String,
    pub insights: String,
    pub email_response: String,
}

impl StructuredSections {
    /// Degraded form used when the response cannot be segmented: everything
    /// lands in `insights`, the other two sections stay empty.
    pub fn unsegmented(text: impl Into<String>) -> Self {
        Self {
            sentiment_analysis: String::new(),
            insights: text.into(),
            email_response: String::new(),
        }
    }
}

/// Split a raw analysis response into its three labeled sections.
///
/// The response is normalized first (markdown glyphs stripped, bullets moved
/// onto their own lines), then cut at the literal heading tokens located in
/// priority order. If any heading is missing the whole normalized response is
/// returned as a single `insights` section instead of panicking.
pub fn split_sections(raw: &str) -> StructuredSections {
    let text = normalize(raw);

    let Some(sentiment_at) = text.find(SENTIMENT_HEADING) else {
        return unsegmented(text);
    };
    let after_sentiment = sentiment_at + SENTIMENT_HEADING.len();

    let Some(insights_at) = text[after_sentiment..]
        .find(INSIGHTS_HEADING)
        .map(|at| at + after_sentiment)
    else {
        return unsegmented(text);
    };
    let after_insights = insights_at + INSIGHTS_HEADING.len();

    let Some(email_at) = text[after_insights..]
        .find(EMAIL_HEADING)
        .map(|at| at + after_insights)
    else {
        return unsegmented(text);
    };

    // Any preamble before the first heading stays attached to the sentiment
    // section so no response text is dropped.
    let sentiment_analysis = text[..insights_at].trim().to_string();
    let insights = text[insights_at..email_at].trim().to_string();

    // The email section gets a line break right after its heading so the
    // draft body starts on its own line.
    let email_body = text[email_at + EMAIL_HEADING.len()..].trim();
    let email_response = if email_body.is_empty() {
        EMAIL_HEADING.to_string()
    } else {
        format!("{}\n{}", EMAIL_HEADING, email_body)
    };

    StructuredSections {
        sentiment_analysis,
        insights,
        email_response,
    }
}

fn unsegmented(text: String) -> StructuredSections {
    warn!("Analysis response missing expected headings; returning unsegmented output");
    StructuredSections::unsegmented(text.trim().to_string())
}

/// Normalize model formatting:
/// - replace mojibake bullet glyphs with a plain two-character marker
/// - strip markdown heading/emphasis markers to plain text
/// - put every `-` bullet delimiter at the start of its own line
fn normalize(raw: &str) -> String {
    let text = raw
        .replace("â€¢", BULLET_MARKER)
        .replace("##", "\n")
        .replace("**", "\n");

    let mut out = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        if ch == '-' && !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push(ch);
    }
    out
}
