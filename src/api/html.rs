//! HTML fragments for the htmx endpoints.

use crate::task::Task;

/// Shown in place of the list when there is nothing to render.
pub const EMPTY_LIST_ITEM: &str = r#"<li class="empty-message">No tasks yet</li>"#;

/// Escape text for use in element content and quoted attributes.
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

/// One `<li>` with a button that completes the task and swaps the item out.
pub fn render_task_item(task: &Task) -> String {
    let id = escape_html(&task.id);
    let title = escape_html(&task.title);
    format!(
        r##"<li id="task-{id}" class="task-item task-{status}">
    <span class="task-title">{title}</span>
    <button
        class="complete-btn"
        title="Mark done"
        hx-patch="/api/tasks/{id}/htmx/complete"
        hx-target="#task-{id}"
        hx-swap="outerHTML"
    ></button>
</li>
"##,
        id = id,
        title = title,
        status = task.status.as_str(),
    )
}

pub fn render_task_list(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return EMPTY_LIST_ITEM.to_string();
    }
    tasks.iter().map(render_task_item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;

    fn task(id: &str, title: &str) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            status: TaskStatus::Todo,
            created_at: 1,
            updated_at: 1,
        }
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#x27;y&#x27;&lt;/script&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn item_carries_id_title_and_complete_button() {
        let html = render_task_item(&task("01ABC", "Buy <milk>"));
        assert!(html.starts_with(r#"<li id="task-01ABC""#));
        assert!(html.contains("Buy &lt;milk&gt;"));
        assert!(!html.contains("<milk>"));
        assert!(html.contains(r#"hx-patch="/api/tasks/01ABC/htmx/complete""#));
        assert!(html.contains(r##"hx-target="#task-01ABC""##));
    }

    #[test]
    fn empty_list_renders_placeholder() {
        assert_eq!(render_task_list(&[]), EMPTY_LIST_ITEM);
        let html = render_task_list(&[task("a", "one"), task("b", "two")]);
        assert_eq!(html.matches("<li ").count(), 2);
        assert!(!html.contains("empty-message"));
    }
}
