use maud::{html, Markup, PreEscaped, DOCTYPE};
use researcher_core::{PostRecord, SentimentLabel};

const STYLESHEET: &str = "\
body { font-family: Arial, sans-serif; margin: 2em; color: #222; }
h1 { color: #ff4500; }
p.generated { color: #666; font-size: 0.9em; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; vertical-align: top; }
th { background-color: #f2f2f2; }
tr:nth-child(even) { background-color: #fafafa; }
a { color: #0079d3; text-decoration: none; }
a:hover { text-decoration: underline; }
";

pub fn sentiment_color(label: SentimentLabel) -> &'static str {
    match label {
        SentimentLabel::Positive => "green",
        SentimentLabel::Negative => "red",
        SentimentLabel::Neutral => "gray",
    }
}

/// Renders the standalone report page. Every interpolated value is escaped.
pub fn render_report(records: &[PostRecord], subreddit: &str) -> Markup {
    let show_summary = records.iter().any(|r| r.summary.is_some());
    let show_sentiment = records.iter().any(|r| r.sentiment.is_some());
    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "r/" (subreddit) " research report" }
                style { (PreEscaped(STYLESHEET)) }
            }
            body {
                h1 { "Research report for r/" (subreddit) }
                p.generated { "Generated " (generated) " from " (records.len()) " posts." }
                table {
                    thead {
                        tr {
                            th { "Title" }
                            @if show_summary { th { "Summary" } }
                            @if show_sentiment { th { "Sentiment" } }
                            th { "Score" }
                            th { "Comments" }
                            th { "Upvote Ratio" }
                        }
                    }
                    tbody {
                        @for record in records {
                            tr {
                                td { a href=(record.url) target="_blank" { (record.title) } }
                                @if show_summary {
                                    td { (record.summary.as_deref().unwrap_or("")) }
                                }
                                @if show_sentiment {
                                    td { (sentiment_cell(record)) }
                                }
                                td { (record.score) }
                                td { (record.num_comments) }
                                td { (format!("{:.0}%", record.upvote_ratio * 100.0)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn sentiment_cell(record: &PostRecord) -> Markup {
    html! {
        @if let Some(label) = record.sentiment {
            span style=(format!("color: {}; font-weight: bold;", sentiment_color(label))) {
                (label.as_str())
            }
            @if let Some(score) = record.sentiment_score {
                " (" (format!("{:.4}", score)) ")"
            }
        }
    }
}
