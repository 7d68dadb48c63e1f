use crate::format::format_timestamp;
use crate::models::{CurrentUser, DiffRow, NotificationView};
use html_escape::{encode_double_quoted_attribute, encode_text};

pub fn render_index(notifications: &[NotificationView], user: Option<&CurrentUser>) -> String {
    let body = if notifications.is_empty() {
        r#"<p class="empty">No notifications available.</p>"#.to_string()
    } else {
        let rows: String = notifications.iter().map(render_row).collect();
        TABLE_HTML.replace("{{ROWS}}", &rows)
    };

    page("Notifications", user, &body)
}

pub fn render_detail(
    view: &NotificationView,
    diff: Option<&[DiffRow]>,
    error: Option<&str>,
    user: Option<&CurrentUser>,
) -> String {
    let id = view.record.id;
    let error_html = error
        .map(|message| {
            format!(
                r#"<p class="status" data-type="error">Action failed: {}</p>"#,
                encode_text(message)
            )
        })
        .unwrap_or_default();

    let diff_html = diff.map(render_diff).unwrap_or_default();

    let review_html = if view.reviewable {
        format!(
            r#"<form method="post" action="/notifications/{id}/approve"><button class="btn-approve" type="submit">Approve</button></form>
        <form method="post" action="/notifications/{id}/decline"><button class="btn-decline" type="submit">Decline &amp; Revert</button></form>"#
        )
    } else {
        String::new()
    };

    let body = DETAIL_HTML
        .replace("{{ID}}", &id.to_string())
        .replace("{{ERROR}}", &error_html)
        .replace("{{EMPLOYEE}}", &encode_text(&view.employee_name))
        .replace("{{ACTION}}", &encode_text(&view.action_label))
        .replace(
            "{{TIMESTAMP}}",
            &encode_text(&format_timestamp(view.record.timestamp)),
        )
        .replace(
            "{{STATUS}}",
            &encode_text(&view.record.status.as_str().to_uppercase()),
        )
        .replace("{{DIFF}}", &diff_html)
        .replace("{{REVIEW}}", &review_html);

    page("Notification Details", user, &body)
}

fn render_row(view: &NotificationView) -> String {
    let record = &view.record;
    format!(
        r#"<tr>
          <td>{employee}</td>
          <td>{action}</td>
          <td>{timestamp}</td>
          <td><span class="chip" data-color="{badge}">{status}</span></td>
          <td class="manage"><a class="btn-view" href="/notifications/{id}">View Details</a></td>
        </tr>
"#,
        employee = encode_text(&view.employee_name),
        action = encode_text(&view.action_label),
        timestamp = encode_text(&format_timestamp(record.timestamp)),
        badge = encode_double_quoted_attribute(view.status_badge),
        status = encode_text(&record.status.as_str().to_uppercase()),
        id = record.id,
    )
}

fn render_diff(rows: &[DiffRow]) -> String {
    let body: String = rows
        .iter()
        .map(|row| {
            format!(
                r#"<tr{class}><td>{label}</td><td>{previous}</td><td>{current}</td></tr>
"#,
                class = if row.changed { r#" class="changed""# } else { "" },
                label = encode_text(&row.label),
                previous = encode_text(&row.previous),
                current = encode_text(&row.current),
            )
        })
        .collect();

    DIFF_HTML.replace("{{ROWS}}", &body)
}

fn page(title: &str, user: Option<&CurrentUser>, body: &str) -> String {
    let signed_in = user
        .map(|user| format!("Signed in as {}", encode_text(&user.username)))
        .unwrap_or_default();

    PAGE_HTML
        .replace("{{TITLE}}", &encode_text(title))
        .replace("{{USER}}", &signed_in)
        .replace("{{BODY}}", body)
}

const TABLE_HTML: &str = r#"<table>
      <thead>
        <tr>
          <th>Employee</th>
          <th>Action</th>
          <th>Timestamp</th>
          <th>Status</th>
          <th class="manage">Manage</th>
        </tr>
      </thead>
      <tbody>
{{ROWS}}      </tbody>
    </table>"#;

const DIFF_HTML: &str = r#"<table class="diff">
      <thead>
        <tr>
          <th>Field</th>
          <th>Previous</th>
          <th>New</th>
        </tr>
      </thead>
      <tbody>
{{ROWS}}      </tbody>
    </table>"#;

const DETAIL_HTML: &str = r#"{{ERROR}}
    <dl class="facts">
      <dt>Employee</dt><dd>{{EMPLOYEE}}</dd>
      <dt>Action</dt><dd>{{ACTION}}</dd>
      <dt>Timestamp</dt><dd>{{TIMESTAMP}}</dd>
      <dt>Status</dt><dd>{{STATUS}}</dd>
    </dl>
    {{DIFF}}
    <section class="actions">
      {{REVIEW}}
      <form method="post" action="/notifications/{{ID}}/delete"><button class="btn-delete" type="submit">Delete</button></form>
      <a class="btn-view" href="/">Close</a>
    </section>"#;

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --ink: #2b2a28;
      --accent: #9c27b0;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.92);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), #f3e5f5 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      background: var(--card);
      border-radius: 24px;
      box-shadow: var(--shadow);
      padding: 32px;
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      justify-content: space-between;
      align-items: baseline;
    }

    h1 {
      margin: 0;
      font-size: 1.8rem;
    }

    .user {
      color: #6b645d;
      font-size: 0.9rem;
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th, td {
      text-align: left;
      padding: 10px 12px;
      border-bottom: 1px solid rgba(47, 72, 88, 0.1);
    }

    .manage {
      text-align: right;
    }

    tr.changed {
      background: #ffebee;
    }

    .chip {
      border-radius: 999px;
      padding: 4px 10px;
      font-size: 0.8rem;
      font-weight: 600;
      background: #e0e0e0;
    }

    .chip[data-color="warning"] { background: #ffe0b2; }
    .chip[data-color="success"] { background: #c8e6c9; }
    .chip[data-color="error"] { background: #ffcdd2; }

    .facts {
      display: grid;
      grid-template-columns: max-content 1fr;
      gap: 6px 16px;
      margin: 0;
    }

    .facts dt {
      font-weight: 600;
    }

    .actions {
      display: flex;
      gap: 12px;
      justify-content: flex-end;
    }

    button, .btn-view {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 8px 16px;
      font-size: 0.9rem;
      font-weight: 600;
      cursor: pointer;
      text-decoration: none;
      color: white;
      background: var(--accent-2);
    }

    .btn-approve { background: #2e7d32; }
    .btn-decline, .btn-delete { background: #c62828; }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .empty {
      color: #6b645d;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>{{TITLE}}</h1>
      <span class="user">{{USER}}</span>
    </header>
    {{BODY}}
  </main>
</body>
</html>
"#;
