use tabular::{Row, Table};

use crate::bank::Cell;
use crate::editor::ActiveEditor;
use crate::session::{AnalyticsRecord, AnalyticsSummary, QuestionView};

pub fn print_question(view: &QuestionView) {
    let mut marks = Vec::new();
    if view.flagged { marks.push("FLAGGED"); }
    if view.skipped { marks.push("SKIPPED"); }
    if view.locked { marks.push("ANSWERED"); }

    println!("Question {}/{} ({})  score: {}  time: {}s  {}",
        view.index + 1, view.total, view.question.kind(), view.score, view.elapsed_seconds, marks.join(" "));
    println!("{}", view.question.text());

    match &view.editor {
        ActiveEditor::Choice { options, selected } => {
            let mut table = Table::new("\t{:>} {:<} {:<}");
            for (i, option) in options.iter().enumerate() {
                let mark = if selected.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(option)) { "*" } else { "" };
                table.add_row(Row::new().with_cell(i + 1).with_cell(option).with_cell(mark));
            }
            println!("{}", table);
            if let Some(text) = selected.as_ref().filter(|s| !options.contains(s)) {
                println!("\tyour answer: {}", text);
            }
        },
        ActiveEditor::Text { value } => {
            println!("\tyour answer: {}", value.as_deref().unwrap_or("(type it with `answer`)"));
        },
        ActiveEditor::Matching(editor) => {
            let mut table = Table::new("\t{:>} {:<}  {:>} {:<}");
            for (i, (term, definition)) in editor.terms().iter().zip(editor.definitions()).enumerate() {
                table.add_row(Row::new()
                    .with_cell(i + 1).with_cell(term)
                    .with_cell(i + 1).with_cell(definition));
            }
            println!("{}", table);
        },
        ActiveEditor::Sequence { editor, .. } => {
            let mut table = Table::new("\t{:>} {:<}");
            for (i, token) in editor.tokens().iter().enumerate() {
                table.add_row(Row::new().with_cell(i + 1).with_cell(token));
            }
            println!("{}", table);
        },
        ActiveEditor::WordSearch(board) => {
            let columns = board.grid().iter().map(Vec::len).max().unwrap_or(0);
            let layout = format!("\t{}", vec!["{:^}"; columns + 1].join(" "));
            let mut table = Table::new(&layout);
            let mut header = Row::new().with_cell("");
            for col in 0..columns {
                header.add_cell(col + 1);
            }
            table.add_row(header);
            for (r, row) in board.grid().iter().enumerate() {
                let mut line = Row::new().with_cell(r + 1);
                for col in 0..columns {
                    let cell = Cell::new(r, col);
                    let text = match row.get(col) {
                        Some(letter) if board.is_claimed(cell) => format!("[{}]", letter),
                        Some(letter) if board.path().contains(&cell) => format!("({})", letter),
                        Some(letter) => letter.to_string(),
                        None => "".to_string(),
                    };
                    line.add_cell(text);
                }
                table.add_row(line);
            }
            println!("{}", table);
            let words: Vec<String> = board.words().iter()
                .map(|w| if board.is_found(w) { format!("[{}]", w) } else { w.clone() })
                .collect();
            println!("\twords: {}", words.join(" "));
        },
        ActiveEditor::Unsupported => {
            println!("\tThis kind of question cannot be answered here yet, use `skip`.");
        },
    }
}

pub fn print_summary(summary: &AnalyticsSummary) {
    let table = Table::new("\t{:<} {:>}")
        .with_heading("Results:")
        .with_row(Row::new().with_cell("score").with_cell(format!("{}/{}", summary.score, summary.total)))
        .with_row(Row::new().with_cell("average time").with_cell(format!("{:.1}s", summary.average_time_seconds)))
        .with_row(Row::new().with_cell("flagged").with_cell(summary.flagged_count))
        .with_row(Row::new().with_cell("skipped").with_cell(summary.skipped_count));
    println!("{}", table);
}

pub fn print_analytics(analytics: &[AnalyticsRecord]) {
    let mut table = Table::new("\t{:>} {:>} {:<} {:<}");
    table.add_heading("\tAnswers:");
    table.add_row(Row::new().with_cell("id").with_cell("time").with_cell("").with_cell("answer"));
    for record in analytics {
        table.add_row(Row::new()
            .with_cell(record.question_id)
            .with_cell(format!("{}s", record.time_spent_seconds))
            .with_cell(if record.correct { "correct" } else { "wrong" })
            .with_cell(record.answer.as_ref().map(|a| a.describe()).unwrap_or_default()));
    }
    println!("{}", table);
}
