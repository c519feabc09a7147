//! Server-rendered HTML for the browser form.
//!
//! One page: a text box, quick examples, tips, the result panel and a
//! disclaimer. Everything derived from user input or the corpus goes
//! through [`escape_html`].

use verity_core::{AssessError, ConfidenceBucket, Label, Verdict};

pub const QUICK_EXAMPLES: &[&str] = &[
    "Breaking: Scientists discover revolutionary cancer treatment with 95% success rate",
    "Government announces free college education for all students starting next semester",
    "Celebrity claims COVID-19 vaccine contains tracking microchips",
    "New study shows chocolate helps with weight loss and improves memory",
];

const ANALYSIS_TIPS: &[&str] = &[
    "Copy-paste full articles for best results.",
    "Check headlines for emotional language.",
    "Verify dates and sources.",
    "Look for evidence and citations.",
];

/// What the result panel shows.
pub enum Outcome<'a> {
    Empty,
    Verdict(&'a Verdict),
    Error(&'a AssessError),
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn headline(label: Label) -> (&'static str, &'static str) {
    match label {
        Label::Real => ("Likely credible", "credible"),
        Label::Fake => ("Potentially misleading", "misleading"),
    }
}

fn bucket_text(bucket: ConfidenceBucket) -> &'static str {
    match bucket {
        ConfidenceBucket::High => "high confidence",
        ConfidenceBucket::Medium => "medium confidence",
        ConfidenceBucket::Low => "low confidence",
    }
}

pub fn render_verdict(verdict: &Verdict) -> String {
    let (title, class) = headline(verdict.label);

    let matches: String = verdict
        .matches
        .iter()
        .map(|m| {
            format!(
                "<li><span class=\"tag {}\">{}</span> {:.0}% similar: {}</li>",
                m.label,
                m.label,
                m.score * 100.0,
                escape_html(&m.text)
            )
        })
        .collect();

    let tips: String = verdict
        .recommendations
        .iter()
        .map(|r| format!("<li>{}</li>", escape_html(r)))
        .collect();

    format!(
        r#"<section class="result {class}">
<h2>{title}</h2>
<p><strong>Confidence:</strong> {confidence:.1}% ({bucket})</p>
<p><strong>Classifier:</strong> {clf_label} at {clf_conf:.1}%. <strong>Reference agreement:</strong> {agreement:.0}% of {count} similar articles.</p>
<h3>Most similar reference articles</h3>
<ol class="matches">{matches}</ol>
<h3>Recommendations</h3>
<ul class="tips">{tips}</ul>
</section>"#,
        confidence = verdict.confidence * 100.0,
        bucket = bucket_text(verdict.bucket),
        clf_label = verdict.classification.label,
        clf_conf = verdict.classification.confidence * 100.0,
        agreement = verdict.agreement * 100.0,
        count = verdict.matches.len(),
    )
}

pub fn render_error(error: &AssessError) -> String {
    format!(
        "<section class=\"result error\"><p>{}</p></section>",
        escape_html(error.user_message())
    )
}

/// Full page. `text` is echoed back into the text box.
pub fn render_page(text: &str, outcome: Outcome<'_>) -> String {
    let result = match outcome {
        Outcome::Empty => {
            "<section class=\"result idle\"><p>Enter news content above to get started.</p></section>"
                .to_string()
        }
        Outcome::Verdict(v) => render_verdict(v),
        Outcome::Error(e) => render_error(e),
    };

    let examples: String = QUICK_EXAMPLES
        .iter()
        .map(|ex| {
            let ex = escape_html(ex);
            format!(
                "<form method=\"post\" action=\"/\"><input type=\"hidden\" name=\"text\" value=\"{ex}\"><button type=\"submit\" class=\"example\">{ex}</button></form>"
            )
        })
        .collect();

    let tips: String = ANALYSIS_TIPS
        .iter()
        .map(|t| format!("<li>{t}</li>"))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Verity: news credibility check</title>
<style>
body {{ font-family: system-ui, sans-serif; max-width: 58rem; margin: 2rem auto; padding: 0 1rem; color: #1f2937; }}
textarea {{ width: 100%; min-height: 7rem; font: inherit; }}
.columns {{ display: grid; grid-template-columns: 2fr 1fr; gap: 2rem; }}
.example {{ display: block; width: 100%; text-align: left; margin-bottom: .4rem; cursor: pointer; }}
.result {{ margin-top: 2rem; padding: 1rem; border-radius: .6rem; border-left: 4px solid #9ca3af; background: #f3f4f6; }}
.result.credible {{ border-color: #22c55e; background: #22c55e20; }}
.result.misleading {{ border-color: #ef4444; background: #ef444420; }}
.result.error {{ border-color: #f59e0b; background: #f59e0b20; }}
.tag {{ font-size: .75rem; text-transform: uppercase; padding: 0 .3rem; border-radius: .2rem; background: #e5e7eb; }}
footer {{ margin-top: 3rem; text-align: center; color: #6b7280; font-size: .9rem; }}
</style>
</head>
<body>
<h1>News credibility check</h1>
<p>Paste a headline or article. Verity combines a trained classifier with a search over labeled reference news.</p>
<div class="columns">
<div>
<form method="post" action="/">
<label for="text">News headline or content</label>
<textarea id="text" name="text" placeholder="Paste news article, headline, or social media post here...">{text}</textarea>
<button type="submit">Analyze credibility</button>
</form>
</div>
<aside>
<h3>Quick examples</h3>
{examples}
<h3>Tips for analysis</h3>
<ul>{tips}</ul>
</aside>
</div>
{result}
<footer>
<p><strong>Educational tool disclaimer:</strong> this analysis is for educational purposes only. Always verify information through multiple reputable sources before making decisions.</p>
</footer>
</body>
</html>
"#,
        text = escape_html(text),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use verity_core::{ClassificationResult, SimilarityMatch};

    fn verdict() -> Verdict {
        Verdict {
            label: Label::Fake,
            confidence: 0.93,
            bucket: ConfidenceBucket::High,
            classification: ClassificationResult::new(Label::Fake, 0.9),
            agreement: 1.0,
            matches: vec![SimilarityMatch::new("<b>microchips</b> & vaccines", Label::Fake, 0.95)],
            recommendations: vec!["Check \"sources\"".to_string()],
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert('x') & "y"</script>"#),
            "&lt;script&gt;alert(&#x27;x&#x27;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_render_verdict_escapes_corpus_text() {
        let html = render_verdict(&verdict());
        assert!(html.contains("Potentially misleading"));
        assert!(html.contains("93.0%"));
        assert!(html.contains("&lt;b&gt;microchips&lt;/b&gt; &amp; vaccines"));
        assert!(html.contains("Check &quot;sources&quot;"));
        assert!(!html.contains("<b>microchips"));
    }

    #[test]
    fn test_render_page_echoes_escaped_input() {
        let html = render_page("</textarea><script>", Outcome::Empty);
        assert!(html.contains("&lt;/textarea&gt;&lt;script&gt;"));
        assert!(!html.contains("</textarea><script>"));
        assert!(html.contains("Educational tool disclaimer"));
        for ex in QUICK_EXAMPLES {
            assert!(html.contains(ex));
        }
    }

    #[test]
    fn test_render_page_error_notice() {
        let err = AssessError::IndexUnavailable("timeout".to_string());
        let html = render_page("some text", Outcome::Error(&err));
        assert!(html.contains("try again later"));
        assert!(!html.contains("timeout"));
    }
}
