// src/view/render.rs
use chrono::{DateTime, Utc};

use super::{Element, Node};
use crate::models::{ClassificationResult, LevelPercentages, QuestionAnalysis};
use crate::notify::Notification;
use crate::state::{panel_id, ClientState, SubmissionKind, UploadView, TABS};
use crate::taxonomy::{display_label, level_class, level_color, short_name, TaxonomyLevel};

const PREVIEW_ROWS: usize = 10;
const PREVIEW_CHARS: usize = 100;

pub fn render_notification(notification: &Notification) -> Element {
    Element::new("div")
        .id("notification")
        .class("alert")
        .class(format!("alert-{}", notification.severity.as_str()))
        .attr("role", "status")
        .var("alert-color", notification.severity.color())
        .var("alert-ttl", format!("{}s", notification.lifetime_secs()))
        .text(notification.message.clone())
}

/// A backend color, unless it is missing or blank.
fn explicit_color(color: Option<&str>) -> Option<&str> {
    color.filter(|c| !c.trim().is_empty())
}

/// Single-question result panel. The level label takes the backend's color
/// when it sent one.
pub fn render_classification(result: Option<&ClassificationResult>, visible: bool) -> Element {
    let section = Element::new("section")
        .id("resultSection")
        .class("result-section")
        .class_if(!visible || result.is_none(), "hidden");

    let Some(result) = result else {
        return section;
    };

    let color = explicit_color(Some(result.color.as_str())).unwrap_or_else(|| level_color(&result.level));

    section
        .child(Element::new("h3").text("Classification Result"))
        .child(
            Element::new("div")
                .class("result-question")
                .child(Element::new("span").class("label").text("Question: "))
                .child(Element::new("span").id("displayQuestion").text(result.question.clone())),
        )
        .child(
            Element::new("div")
                .id("resultLevel")
                .class("result-level")
                .class(level_class(&result.level))
                .var("level-color", color.to_string())
                .text(result.level.clone()),
        )
        .child(
            Element::new("p")
                .id("resultDescription")
                .class("result-description")
                .text(result.description.clone()),
        )
}

/// One bar per level with a non-zero count, in the order given.
pub fn render_distribution_chart(percentages: &LevelPercentages) -> Element {
    let bars = percentages.iter().filter(|(_, stat)| stat.count > 0).map(|(level, stat)| {
        let plural = if stat.count == 1 { "" } else { "s" };
        Element::new("div")
            .class("distribution-bar")
            .class(level_class(level))
            .attr("data-level", level)
            .child(
                Element::new("div")
                    .class("level-info")
                    .child(Element::new("div").class("level-name").text(display_label(level)))
                    .child(
                        Element::new("div").class("level-stats").child(
                            Element::new("span")
                                .class("percentage-badge")
                                .text(format!("{}%", stat.percentage)),
                        ),
                    ),
            )
            .child(
                Element::new("div").class("progress-container").child(
                    Element::new("div")
                        .class("progress-fill")
                        .var("bar-width", format!("{}%", stat.percentage)),
                ),
            )
            .child(
                Element::new("div")
                    .class("question-count")
                    .text(format!("{} question{}", stat.count, plural)),
            )
    });

    Element::new("div").id("distributionChart").class("distribution-chart").children(bars)
}

fn level_badges(question: &QuestionAnalysis) -> Element {
    let container = Element::new("div").class("level-badges");

    match question.ranked_levels() {
        Some(levels) => container.children(levels.iter().enumerate().map(|(idx, level)| {
            let mut badge = Element::new("span")
                .class("level-badge")
                .class("level-badge-compact")
                .class(level_class(&level.level));
            if let Some(color) = explicit_color(Some(level.color.as_str())) {
                badge = badge.var("level-color", color.to_string());
            }
            badge
                .var("badge-opacity", if idx == 0 { "1" } else { "0.8" })
                .text(short_name(&level.level))
        })),
        None => {
            let mut badge = Element::new("span")
                .class("level-badge")
                .class(level_class(&question.level))
                .var("badge-opacity", "1");
            if let Some(color) = explicit_color(question.color.as_deref()) {
                badge = badge.var("level-color", color.to_string());
            }
            let text = question.level_display.as_deref().unwrap_or(&question.level);
            container.child(badge.text(text))
        }
    }
}

fn question_item(question: &QuestionAnalysis) -> Element {
    let mut number = Element::new("span")
        .class("question-number")
        .text(format!("Question {}", question.question_number));
    if question.is_multi_level {
        number = number.child(Element::new("span").class("multi-level-badge").text("MULTI-LEVEL"));
    }

    Element::new("div")
        .class("question-item")
        .class_if(question.is_multi_level, "multi-level")
        .child(
            Element::new("div")
                .class("question-header")
                .child(number)
                .child(level_badges(question)),
        )
        .child(Element::new("div").class("question-text").text(question.question.clone()))
        .child(
            Element::new("div")
                .class("question-description")
                .text(question.description.clone()),
        )
}

/// Per-question breakdown, in the order supplied.
pub fn render_question_list(questions: &[QuestionAnalysis]) -> Element {
    Element::new("div")
        .id("questionsContainer")
        .class("questions-container")
        .children(questions.iter().map(question_item))
}

fn truncate(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// First rows of the report, with a note when more questions exist.
pub fn render_report_preview(questions: &[QuestionAnalysis]) -> Element {
    let rows = questions.iter().take(PREVIEW_ROWS).map(|q| {
        let mut badge = Element::new("span").class("level-badge").class(level_class(&q.level));
        if let Some(color) = explicit_color(q.color.as_deref()) {
            badge = badge.var("level-color", color.to_string());
        }
        Element::new("tr")
            .child(Element::new("td").text(truncate(&q.question)))
            .child(Element::new("td").child(badge.text(q.level.clone())))
            .child(Element::new("td").class("preview-description").text(q.description.clone()))
    });

    let mut body = Element::new("tbody").id("reportPreviewBody").children(rows);
    if questions.len() > PREVIEW_ROWS {
        body = body.child(
            Element::new("tr").class("preview-note").child(
                Element::new("td").attr("colspan", "3").text(format!(
                    "... and {} more questions (download full report to see all)",
                    questions.len() - PREVIEW_ROWS
                )),
            ),
        );
    }

    Element::new("table")
        .id("reportPreview")
        .class("report-preview")
        .child(
            Element::new("thead").child(
                Element::new("tr")
                    .child(Element::new("th").text("Question"))
                    .child(Element::new("th").text("Level"))
                    .child(Element::new("th").text("Description")),
            ),
        )
        .child(body)
}

/// File result panel: summary, chart, question list, preview, download.
pub fn render_upload_result(upload: Option<&UploadView>, visible: bool, download_ready: bool) -> Element {
    let section = Element::new("section")
        .id("fileResultSection")
        .class("result-section")
        .class_if(!visible || upload.is_none(), "hidden");

    let Some(upload) = upload else {
        return section;
    };
    let analysis = &upload.analysis;

    let summary = Element::new("div")
        .class("file-summary")
        .child(stat("fileName", "File", upload.filename.clone()))
        .child(stat("totalQuestions", "Total Questions", analysis.total_questions.to_string()))
        .child(stat("highestLevel", "Most Common Level", analysis.most_common_level().to_string()));

    section
        .child(Element::new("h3").text("Analysis Results"))
        .child(summary)
        .child(Element::new("h4").text("Level Distribution"))
        .child(render_distribution_chart(&analysis.level_percentages))
        .child(Element::new("h4").text("Questions"))
        .child(render_question_list(&analysis.questions))
        .child(Element::new("h4").text("Report Preview"))
        .child(render_report_preview(&analysis.questions))
        .child(
            Element::new("div")
                .id("downloadActions")
                .class("download-actions")
                .class_if(!download_ready, "hidden")
                .child(
                    Element::new("a")
                        .id("downloadPdfBtn")
                        .class("btn")
                        .attr("href", "/download_report/pdf")
                        .text("Download PDF Report"),
                ),
        )
}

fn stat(id: &str, label: &str, value: String) -> Element {
    Element::new("div")
        .class("stat")
        .child(Element::new("span").class("stat-label").text(label))
        .child(Element::new("span").id(id).class("stat-value").text(value))
}

fn post_button(action: String, class: &str, label: &str) -> Element {
    Element::new("form")
        .attr("method", "post")
        .attr("action", action)
        .class("inline-form")
        .child(Element::new("button").attr("type", "submit").class(class).text(label))
}

fn render_tabs(state: &ClientState) -> Element {
    Element::new("nav").class("tabs").children(TABS.iter().map(|(key, label)| {
        let mut form = post_button(format!("/actions/tab/{}", key), "tab-btn", label);
        if let Some(Node::Element(button)) = form.children.first_mut() {
            button.attrs.push(("data-tab", key.to_string()));
            if state.tabs.is_button_active(key) {
                button.classes.push("active".to_string());
            }
        }
        form
    }))
}

fn tab_panel(state: &ClientState, key: &str) -> Element {
    let id = panel_id(key);
    Element::new("div")
        .class("tab-content")
        .class_if(state.tabs.is_panel_active(&id), "active")
        .id(id)
}

fn render_single_tab(state: &ClientState) -> Element {
    tab_panel(state, "single")
        .child(
            Element::new("form")
                .id("classifyForm")
                .attr("method", "post")
                .attr("action", "/actions/classify")
                .attr("data-loading-text", SubmissionKind::Classify.loading_text())
                .class("question-form")
                .child(
                    Element::new("input")
                        .id("questionInput")
                        .attr("type", "text")
                        .attr("name", "question")
                        .attr("placeholder", "Enter your question here...")
                        .attr("value", state.question_draft.clone()),
                )
                .child(
                    Element::new("button")
                        .id("classifyBtn")
                        .attr("type", "submit")
                        .class("btn")
                        .text("Classify Question"),
                ),
        )
        .child(render_classification(state.classification.as_ref(), state.classification_visible))
}

fn render_file_tab(state: &ClientState, accept: &str) -> Element {
    tab_panel(state, "file")
        .child(
            Element::new("form")
                .id("reportUploadForm")
                .attr("method", "post")
                .attr("action", "/actions/upload?source=input")
                .attr("enctype", "multipart/form-data")
                .attr("data-loading-text", SubmissionKind::Upload.loading_text())
                .child(
                    Element::new("label")
                        .id("reportUploadArea")
                        .class("upload-area")
                        .attr("for", "reportFileInput")
                        .child(Element::new("p").text("Drag and drop your spreadsheet here, or"))
                        .child(Element::new("span").id("browseBtn").class("browse-btn").text("Browse Files"))
                        .child(
                            Element::new("input")
                                .id("reportFileInput")
                                .attr("type", "file")
                                .attr("name", "file")
                                .attr("accept", accept),
                        ),
                )
                .child(
                    Element::new("button")
                        .attr("type", "submit")
                        .class("btn")
                        .text("Analyze Questions"),
                ),
        )
        .child(render_upload_result(state.upload.as_ref(), state.upload_visible, state.download_ready))
}

fn render_level_cards() -> Element {
    Element::new("section").class("level-cards").children(TaxonomyLevel::ALL.iter().map(|level| {
        Element::new("div")
            .class("level-card")
            .class(level.css_class())
            .attr("data-level", level.name())
            .child(Element::new("h4").text(display_label(&level.code())))
            .child(Element::new("p").text(level.description()))
            .child(post_button(format!("/actions/example/{}", level.name()), "example-btn", "Try an example"))
    }))
}

pub fn render_loading(state: &ClientState) -> Element {
    Element::new("div")
        .id("loadingOverlay")
        .class("loading-overlay")
        .class_if(!state.is_loading(), "hidden")
        .child(Element::new("div").class("spinner"))
        .child(Element::new("p").id("loadingText").text(state.loading_text().unwrap_or_default()))
}

/// The whole page as a function of `state` at time `now`.
pub fn render_page(state: &ClientState, allowed_extensions: &[String], now: DateTime<Utc>) -> Element {
    let accept = allowed_extensions.join(",");

    let mut body = Element::new("body")
        .child(
            Element::new("header")
                .child(Element::new("h1").text("Bloom's Taxonomy Classifier"))
                .child(Element::new("p").text("Classify questions by cognitive level")),
        )
        .child(render_tabs(state))
        .child(
            Element::new("main")
                .child(render_single_tab(state))
                .child(render_file_tab(state, &accept)),
        )
        .child(render_level_cards())
        .child(render_loading(state));

    if let Some(notification) = state.active_notification(now) {
        body = body.child(render_notification(notification));
    }

    Element::new("html")
        .attr("lang", "en")
        .child(
            Element::new("head")
                .child(Element::new("meta").attr("charset", "utf-8"))
                .child(Element::new("title").text("Bloom's Taxonomy Classifier"))
                .child(
                    Element::new("link")
                        .attr("rel", "stylesheet")
                        .attr("href", "/static/style.css"),
                )
                .child(Element::new("script").attr("src", "/static/app.js").attr("defer", "defer")),
        )
        .child(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LevelScore, LevelStat, Ordered, UploadAnalysis};
    use crate::notify::Severity;
    use std::time::Duration;

    fn stat(count: u32, percentage: f64) -> LevelStat {
        LevelStat { count, percentage }
    }

    fn question(n: u32, level: &str) -> QuestionAnalysis {
        QuestionAnalysis {
            question_number: n,
            question: format!("Question text {}", n),
            description: "Recall facts and basic concepts".into(),
            level: level.into(),
            level_display: None,
            color: None,
            is_multi_level: false,
            all_levels: None,
        }
    }

    #[test]
    fn test_chart_skips_zero_counts() {
        let percentages: LevelPercentages = Ordered(vec![
            ("L1-Remember".into(), stat(5, 50.0)),
            ("L2-Understand".into(), stat(0, 0.0)),
            ("L3-Apply".into(), stat(5, 50.0)),
        ]);
        let chart = render_distribution_chart(&percentages);

        let bars = chart.find_by_class("distribution-bar");
        assert_eq!(bars.len(), 2);

        let labels: Vec<String> = chart.find_by_class("level-name").iter().map(|e| e.text_content()).collect();
        assert_eq!(labels, vec!["Level 1: Remember", "Level 3: Apply"]);

        for fill in chart.find_by_class("progress-fill") {
            assert_eq!(fill.get_var("bar-width"), Some("50%"));
        }
        let badges: Vec<String> =
            chart.find_by_class("percentage-badge").iter().map(|e| e.text_content()).collect();
        assert_eq!(badges, vec!["50%", "50%"]);
        assert!(bars[0].has_class("level-remember"));
        assert!(bars[1].has_class("level-apply"));
    }

    #[test]
    fn test_chart_count_pluralization_and_fallback() {
        let percentages: LevelPercentages = Ordered(vec![
            ("L6-Create".into(), stat(1, 33.3)),
            ("Mystery".into(), stat(2, 66.7)),
        ]);
        let chart = render_distribution_chart(&percentages);
        let counts: Vec<String> =
            chart.find_by_class("question-count").iter().map(|e| e.text_content()).collect();
        assert_eq!(counts, vec!["1 question", "2 questions"]);
        assert!(chart.find_by_class("distribution-bar")[1].has_class("level-unknown"));
    }

    #[test]
    fn test_chart_rerender_replaces_bars() {
        let first: LevelPercentages = Ordered(vec![("L1-Remember".into(), stat(3, 100.0))]);
        let second: LevelPercentages = Ordered(vec![("L4-Analyze".into(), stat(2, 100.0))]);
        let _ = render_distribution_chart(&first);
        let chart = render_distribution_chart(&second);
        let labels: Vec<String> = chart.find_by_class("level-name").iter().map(|e| e.text_content()).collect();
        assert_eq!(labels, vec!["Level 4: Analyze"]);
    }

    #[test]
    fn test_multi_level_badges() {
        let mut q = question(1, "L6-Create");
        q.is_multi_level = true;
        q.all_levels = Some(vec![
            LevelScore { level: "L6-Create".into(), color: "#DDA0DD".into(), score: Some(8.0), description: None },
            LevelScore { level: "L5-Evaluate".into(), color: "#FFEAA7".into(), score: Some(5.0), description: None },
        ]);
        let list = render_question_list(&[q]);

        let badges = list.find_by_class("level-badge");
        assert_eq!(badges.len(), 2);
        let opacities: Vec<f64> = badges
            .iter()
            .map(|b| b.get_var("badge-opacity").unwrap().parse().unwrap())
            .collect();
        assert_eq!(opacities, vec![1.0, 0.8]);
        assert_eq!(badges[0].text_content(), "Create");
        assert_eq!(badges[1].text_content(), "Evaluate");
        assert_eq!(badges[1].get_var("level-color"), Some("#FFEAA7"));

        let item = &list.find_by_class("question-item")[0];
        assert!(item.has_class("multi-level"));
        assert_eq!(list.find_by_class("multi-level-badge")[0].text_content(), "MULTI-LEVEL");
        assert_eq!(list.find_by_class("question-number")[0].text_content(), "Question 1MULTI-LEVEL");
    }

    #[test]
    fn test_single_level_badge() {
        let mut q = question(3, "L2-Understand");
        q.level_display = Some("Understand".into());
        q.all_levels = Some(vec![
            LevelScore { level: "L2-Understand".into(), color: "#4ECDC4".into(), score: None, description: None },
            LevelScore { level: "L1-Remember".into(), color: "#FF6B6B".into(), score: None, description: None },
        ]);
        let list = render_question_list(&[q]);

        let badges = list.find_by_class("level-badge");
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].text_content(), "Understand");
        assert!(badges[0].has_class("level-understand"));
        assert!(badges[0].get_var("level-color").is_none());
        assert!(list.find_by_class("multi-level-badge").is_empty());
    }

    #[test]
    fn test_blank_colors_fall_back_to_level_class() {
        let mut single = question(1, "L4-Analyze");
        single.color = Some(String::new());
        let mut multi = question(2, "L6-Create");
        multi.is_multi_level = true;
        multi.all_levels = Some(vec![
            LevelScore { level: "L6-Create".into(), color: "".into(), score: None, description: None },
            LevelScore { level: "L5-Evaluate".into(), color: " ".into(), score: None, description: None },
        ]);

        let list = render_question_list(&[single.clone(), multi]);
        for badge in list.find_by_class("level-badge") {
            assert!(badge.get_var("level-color").is_none());
        }
        let table = render_report_preview(&[single]);
        assert!(table.find_by_class("level-badge")[0].get_var("level-color").is_none());
        assert!(!table.to_html().contains("--level-color"));
    }

    #[test]
    fn test_notification_carries_severity_color_and_lifetime() {
        let n = Notification::at("oops", Severity::Error, Duration::from_secs(8), Utc::now());
        let alert = render_notification(&n);
        assert_eq!(alert.get_var("alert-color"), Some("#dc3545"));
        assert_eq!(alert.get_var("alert-ttl"), Some("8s"));
    }

    #[test]
    fn test_page_wires_upload_surfaces() {
        let page = render_page(&ClientState::default(), &[".csv".to_string()], Utc::now());
        let form = page.find_by_id("reportUploadForm").unwrap();
        assert_eq!(form.get_attr("action"), Some("/actions/upload?source=input"));
        assert!(page.find_by_id("reportUploadArea").is_some());
        assert!(page.find_by_id("reportFileInput").is_some());
        assert!(page.find_by_id("browseBtn").is_some());
        assert!(page.find_by_id("loadingOverlay").unwrap().has_class("hidden"));
        assert!(page.to_html().contains(r#"<script src="/static/app.js" defer="defer"></script>"#));
    }

    #[test]
    fn test_question_order_preserved() {
        let list = render_question_list(&[question(2, "L3-Apply"), question(1, "L1-Remember")]);
        let numbers: Vec<String> =
            list.find_by_class("question-number").iter().map(|e| e.text_content()).collect();
        assert_eq!(numbers, vec!["Question 2", "Question 1"]);
    }

    #[test]
    fn test_report_preview_caps_rows() {
        let mut questions: Vec<QuestionAnalysis> = (1..=12).map(|n| question(n, "L1-Remember")).collect();
        questions[0].question = "x".repeat(150);
        let table = render_report_preview(&questions);

        let body = table.find_by_id("reportPreviewBody").unwrap();
        assert_eq!(body.children.len(), 11);
        let note = table.find_by_class("preview-note");
        assert_eq!(
            note[0].text_content(),
            "... and 2 more questions (download full report to see all)"
        );
        let first_cell = body.children[0].as_element().unwrap().children[0].as_element().unwrap();
        assert_eq!(first_cell.text_content(), format!("{}...", "x".repeat(100)));
    }

    #[test]
    fn test_classification_uses_backend_color() {
        let result = ClassificationResult {
            question: "Explain photosynthesis".into(),
            level: "L2-Understand".into(),
            description: "Explain ideas and concepts".into(),
            color: "#123456".into(),
        };
        let section = render_classification(Some(&result), true);
        assert!(!section.has_class("hidden"));
        assert_eq!(section.find_by_id("resultLevel").unwrap().get_var("level-color"), Some("#123456"));
        assert_eq!(
            section.find_by_id("displayQuestion").unwrap().text_content(),
            "Explain photosynthesis"
        );

        let mut blank = result.clone();
        blank.color = String::new();
        let section = render_classification(Some(&blank), true);
        assert_eq!(section.find_by_id("resultLevel").unwrap().get_var("level-color"), Some("#4ECDC4"));
    }

    #[test]
    fn test_upload_panel_summary() {
        let analysis: UploadAnalysis = serde_json::from_value(serde_json::json!({
            "total_questions": 6,
            "level_counts": {"L1-Remember": 3, "L2-Understand": 3},
            "level_percentages": {
                "L1-Remember": {"count": 3, "percentage": 50.0},
                "L2-Understand": {"count": 3, "percentage": 50.0}
            },
            "questions": []
        }))
        .unwrap();
        let view = UploadView { filename: "exam.csv".into(), analysis };
        let section = render_upload_result(Some(&view), true, true);

        assert_eq!(section.find_by_id("fileName").unwrap().text_content(), "exam.csv");
        assert_eq!(section.find_by_id("totalQuestions").unwrap().text_content(), "6");
        assert_eq!(section.find_by_id("highestLevel").unwrap().text_content(), "L1-Remember");
        assert!(!section.find_by_id("downloadActions").unwrap().has_class("hidden"));
    }

    #[test]
    fn test_page_hides_expired_notification() {
        let now = Utc::now();
        let mut state = ClientState::default();
        state.notify(Notification::at("done", Severity::Success, Duration::from_secs(5), now));

        let page = render_page(&state, &[".csv".to_string()], now);
        assert!(page.find_by_id("notification").unwrap().has_class("alert-success"));

        let later = now + chrono::Duration::seconds(10);
        let page = render_page(&state, &[".csv".to_string()], later);
        assert!(page.find_by_id("notification").is_none());
    }

    #[test]
    fn test_page_marks_active_tab() {
        let mut state = ClientState::default();
        state.switch_tab("file");
        let page = render_page(&state, &[".csv".to_string()], Utc::now());

        let active: Vec<&Element> = page
            .find_by_class("tab-btn")
            .into_iter()
            .filter(|b| b.has_class("active"))
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].get_attr("data-tab"), Some("file"));
        assert!(page.find_by_id("file-tab").unwrap().has_class("active"));
        assert!(!page.find_by_id("single-tab").unwrap().has_class("active"));
    }
}
