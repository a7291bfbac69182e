use crate::dates::is_order_past_at;
use crate::errors::AppError;
use crate::models::{BoardView, DaySummaryEntry, ProcessedOrder, WeekBucket, WeekDay};
use chrono::{DateTime, SecondsFormat, Utc};

pub fn render_index(view: &BoardView, app_version: i64, now: DateTime<Utc>) -> Result<String, AppError> {
    let week = view
        .board
        .as_ref()
        .map(|board| board.week_number.to_string())
        .unwrap_or_default();
    let updated = view
        .last_updated
        .map(|at| format!("Última atualização: {}", at.format("%d/%m/%Y às %H:%M:%S UTC")))
        .unwrap_or_default();
    // Same encoding serde uses for `last_updated` in /api/week.
    let stamp = view
        .last_updated
        .map(|at| at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        .unwrap_or_default();

    let days = match &view.board {
        Some(board) => {
            let mut cards = String::new();
            for day in WeekDay::ALL {
                let bucket = board
                    .buckets
                    .get(&day)
                    .ok_or_else(|| AppError::internal(format!("board is missing {day:?}")))?;
                cards.push_str(&render_day(day, bucket, now));
            }
            format!(r#"<section class="days">{cards}</section>"#)
        }
        None if view.error.is_none() => LOADING_HTML.to_string(),
        None => String::new(),
    };

    let error = render_error(view.error.as_deref());
    let updated = escape_html(&updated);
    let version = app_version.to_string();
    let values = [
        ("WEEK", week.as_str()),
        ("UPDATED", updated.as_str()),
        ("STAMP", stamp.as_str()),
        ("AUTO_STATE", if view.auto_refresh { "on" } else { "off" }),
        ("AUTO_LABEL", if view.auto_refresh { "ligada" } else { "desligada" }),
        (
            "REFRESH_LABEL",
            if view.refreshing { "Atualizando..." } else { "Atualizar Pedidos" },
        ),
        ("ERROR", error.as_str()),
        ("DAYS", days.as_str()),
        ("VERSION", version.as_str()),
    ];

    Ok(fill_template(INDEX_HTML, &values))
}

// Single pass over the template: substituted text is never scanned again,
// so client names and error messages come out verbatim.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let value = after.find("}}").and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn render_day(day: WeekDay, bucket: &WeekBucket, now: DateTime<Utc>) -> String {
    let header_class = if bucket.is_past { "day-header past" } else { "day-header" };
    let body = if bucket.orders.is_empty() {
        r#"<p class="empty">Não há pedidos para este dia.</p>"#.to_string()
    } else {
        let orders: String = bucket
            .orders
            .iter()
            .map(|order| render_order(order, now))
            .collect();
        format!(
            r#"{summary}<div class="orders">{orders}</div>"#,
            summary = render_summary(&bucket.summary)
        )
    };

    format!(
        r#"<article class="day"><div class="{header_class}"><h2>{name} - {date}</h2></div><div class="day-body">{body}</div></article>"#,
        name = day.display_name(),
        date = escape_html(&bucket.display_date),
    )
}

fn render_summary(summary: &[DaySummaryEntry]) -> String {
    if summary.is_empty() {
        return String::new();
    }

    let rows: String = summary
        .iter()
        .map(|entry| {
            format!(
                r#"<tr><td class="kind" style="color: {color}">{abbr}</td><td>{small}</td><td>{large}</td></tr>"#,
                color = entry.color,
                abbr = entry.abbreviation,
                small = count_cell(entry.small_count),
                large = count_cell(entry.large_count),
            )
        })
        .collect();

    format!(
        r#"<table class="summary"><thead><tr><th>TIPO</th><th>P</th><th>G</th></tr></thead><tbody>{rows}</tbody></table>"#
    )
}

fn render_order(order: &ProcessedOrder, now: DateTime<Utc>) -> String {
    let past = is_order_past_at(&order.original_delivery, now);
    let items: String = order
        .line_items
        .iter()
        .map(|item| {
            let color = if past { "#888888" } else { item.color };
            format!(
                r#"<p class="item" style="color: {color}">{quantity} x {abbr}</p>"#,
                quantity = item.quantity,
                abbr = item.abbreviation,
            )
        })
        .collect();

    format!(
        r#"<div class="order{past_class}"><p class="client">{client}</p>{items}</div>"#,
        past_class = if past { " past" } else { "" },
        client = escape_html(&order.client),
    )
}

fn render_error(error: Option<&str>) -> String {
    match error {
        Some(message) => format!(
            r#"<div class="alert" role="alert"><p class="alert-title">Erro ao carregar dados:</p><p>{}</p><p class="alert-hint">Verifique se o webhook está ativo no n8n, confirme a URL e tente novamente em alguns minutos.</p></div>"#,
            escape_html(message)
        ),
        None => String::new(),
    }
}

fn count_cell(count: u64) -> String {
    if count > 0 {
        count.to_string()
    } else {
        "-".to_string()
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

const LOADING_HTML: &str = r#"<div class="loading"><div class="spinner"></div><p>Carregando pedidos...</p></div>"#;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Bolos da Semana</title>
  <style>
    :root {
      --bg: #fffbeb;
      --ink: #292524;
      --muted: #78716c;
      --amber: #f59e0b;
      --amber-dark: #b45309;
      --past: #6b7280;
      --card: #ffffff;
      --shadow: 0 10px 30px rgba(120, 53, 15, 0.12);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Segoe UI", "Helvetica Neue", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1100px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    header {
      text-align: center;
    }

    h1 {
      margin: 0 0 6px;
      font-size: clamp(2rem, 4vw, 2.6rem);
      color: #92400e;
    }

    .subtitle,
    .updated {
      margin: 0;
      color: var(--muted);
    }

    .toolbar {
      display: flex;
      flex-wrap: wrap;
      justify-content: space-between;
      align-items: center;
      gap: 12px;
    }

    .toolbar form {
      margin: 0;
    }

    button {
      border: none;
      border-radius: 10px;
      padding: 10px 16px;
      font-size: 0.95rem;
      font-weight: 600;
      cursor: pointer;
    }

    .btn-refresh {
      background: #d97706;
      color: white;
    }

    .btn-toggle {
      background: white;
      color: var(--amber-dark);
      border: 1px solid rgba(180, 83, 9, 0.3);
    }

    .btn-toggle[data-state="on"] {
      background: #fef3c7;
    }

    .alert {
      background: #fee2e2;
      border-left: 4px solid #ef4444;
      color: #b91c1c;
      padding: 14px 18px;
    }

    .alert p {
      margin: 4px 0;
    }

    .alert-title {
      font-weight: 700;
    }

    .alert-hint {
      font-size: 0.85rem;
    }

    .days {
      display: grid;
      grid-template-columns: repeat(auto-fill, minmax(300px, 1fr));
      gap: 20px;
    }

    .day {
      background: var(--card);
      border-radius: 12px;
      box-shadow: var(--shadow);
      overflow: hidden;
    }

    .day-header {
      background: var(--amber);
      color: white;
      padding: 14px 16px;
    }

    .day-header.past {
      background: var(--past);
    }

    .day-header h2 {
      margin: 0;
      font-size: 1.2rem;
    }

    .day-body {
      padding: 14px 16px;
    }

    .summary {
      width: 100%;
      border-collapse: collapse;
      font-size: 0.9rem;
      margin-bottom: 12px;
    }

    .summary th {
      background: #f3f4f6;
      font-size: 0.75rem;
      padding: 6px 10px;
      text-align: center;
    }

    .summary th:first-child,
    .summary td.kind {
      text-align: left;
    }

    .summary td {
      border-bottom: 1px solid #e5e7eb;
      padding: 6px 10px;
      text-align: center;
    }

    .summary td.kind {
      font-weight: 600;
    }

    .order {
      padding: 8px 0;
    }

    .order + .order {
      border-top: 1px solid #f3f4f6;
    }

    .client {
      margin: 0;
      font-weight: 600;
    }

    .item {
      margin: 2px 0 0;
      font-size: 0.9rem;
    }

    .order.past .client {
      color: var(--past);
      text-decoration: line-through;
    }

    .order.past .item {
      text-decoration: line-through;
      opacity: 0.7;
    }

    .empty {
      color: var(--muted);
      text-align: center;
      padding: 12px 0;
    }

    .loading {
      text-align: center;
      padding: 48px 0;
      color: var(--muted);
    }

    .spinner {
      display: inline-block;
      width: 32px;
      height: 32px;
      border-radius: 50%;
      border: 3px solid transparent;
      border-bottom-color: #d97706;
      animation: spin 900ms linear infinite;
    }

    footer {
      text-align: center;
      color: var(--muted);
      font-size: 0.9rem;
    }

    footer .version {
      font-size: 0.75rem;
    }

    @keyframes spin {
      to {
        transform: rotate(360deg);
      }
    }
  </style>
</head>
<body>
  <main class="app" data-updated="{{STAMP}}">
    <header>
      <h1>Bolos da Semana {{WEEK}}</h1>
      <p class="subtitle">Confira os pedidos de bolos para cada dia da semana</p>
    </header>

    <section class="toolbar">
      <div>
        <p class="updated">{{UPDATED}}</p>
        <form method="post" action="/auto-refresh/toggle">
          <button class="btn-toggle" type="submit" data-state="{{AUTO_STATE}}">Atualização automática: {{AUTO_LABEL}}</button>
        </form>
      </div>
      <form method="post" action="/refresh">
        <button class="btn-refresh" type="submit">{{REFRESH_LABEL}}</button>
      </form>
    </section>

    {{ERROR}}

    {{DAYS}}

    <footer>
      <p>Os bolos normalmente são finalizados no dia da entrega. Menos os de sábado, que são finalizados na sexta.</p>
      <p>Sempre conferir no Notion!</p>
      <p class="version">Versão: {{VERSION}}</p>
    </footer>
  </main>

  <script>
    const appEl = document.querySelector('.app');

    const checkForUpdate = async () => {
      const res = await fetch('/api/week');
      if (!res.ok) {
        return;
      }
      const view = await res.json();
      if ((view.last_updated || '') !== appEl.dataset.updated || (!view.board && !view.error)) {
        window.location.reload();
      }
    };

    setInterval(() => {
      checkForUpdate().catch(() => {});
    }, 30000);
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::build_board_at;
    use crate::models::{DeliveryWindow, RawOrder};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 21, 9, 0, 0).unwrap()
    }

    fn view_with(orders: &[RawOrder]) -> BoardView {
        BoardView {
            board: Some(build_board_at(orders, now())),
            last_updated: Some(now()),
            auto_refresh: true,
            ..BoardView::default()
        }
    }

    fn order(client: &str, start: &str) -> RawOrder {
        RawOrder {
            client: Some(client.to_string()),
            delivery: Some(DeliveryWindow {
                start: Some(start.to_string()),
                ..DeliveryWindow::default()
            }),
            ..RawOrder::default()
        }
    }

    #[test]
    fn renders_all_days_with_title_and_summary() {
        let orders = [RawOrder {
            pdm_large: Some(2),
            chocolate_small: Some(1),
            ..order("Padaria <Sol>", "2026-10-22")
        }];

        let html = render_index(&view_with(&orders), 42, now()).unwrap();
        assert!(html.contains("Bolos da Semana 43"));
        for day in WeekDay::ALL {
            assert!(html.contains(day.display_name()), "{day:?}");
        }
        assert!(html.contains("Quinta-feira - 22/10"));
        assert!(html.contains("Padaria &lt;Sol&gt;"));
        assert!(html.contains("2 x PDM G"));
        assert!(html.contains(r#"<td class="kind" style="color: #F59E0B">PDM</td><td>-</td><td>2</td>"#));
        assert!(html.contains("Versão: 42"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn past_days_and_orders_are_marked() {
        let orders = [RawOrder {
            pdm_small: Some(1),
            ..order("Cliente antigo", "2026-10-19")
        }];

        let html = render_index(&view_with(&orders), 1, now()).unwrap();
        assert!(html.contains(r#"<div class="day-header past"><h2>Segunda-feira - 19/10</h2>"#));
        assert!(html.contains(r#"<div class="day-header"><h2>Quarta-feira - 21/10</h2>"#));
        assert!(html.contains(r#"<div class="order past">"#));
        assert!(html.contains("color: #888888"));
    }

    #[test]
    fn empty_days_show_placeholder() {
        let html = render_index(&view_with(&[]), 1, now()).unwrap();
        assert_eq!(html.matches("Não há pedidos para este dia.").count(), 6);
    }

    #[test]
    fn error_is_shown_without_board() {
        let view = BoardView {
            error: Some("Erro: HTTP 500".into()),
            ..BoardView::default()
        };
        let html = render_index(&view, 1, now()).unwrap();
        assert!(html.contains("Erro ao carregar dados:"));
        assert!(html.contains("Erro: HTTP 500"));
        assert!(!html.contains("Carregando pedidos..."));
    }

    #[test]
    fn loading_state_before_first_fetch() {
        let html = render_index(&BoardView::default(), 1, now()).unwrap();
        assert!(html.contains("Carregando pedidos..."));
        assert!(html.contains("Atualização automática: desligada"));
    }

    #[test]
    fn client_names_with_braces_are_shown_verbatim() {
        let orders = [RawOrder {
            pdm_large: Some(1),
            ..order("Loja {{VERSION}}", "2026-10-22")
        }];

        let html = render_index(&view_with(&orders), 777, now()).unwrap();
        assert!(html.contains(r#"<p class="client">Loja {{VERSION}}</p>"#));
        assert!(!html.contains("Loja 777"));
        assert!(html.contains("Versão: 777"));
    }

    #[test]
    fn error_text_is_not_expanded() {
        let view = BoardView {
            error: Some("Erro: {{DAYS}} {{WEEK}}".into()),
            ..view_with(&[])
        };
        let html = render_index(&view, 1, now()).unwrap();
        assert!(html.contains("<p>Erro: {{DAYS}} {{WEEK}}</p>"));
        assert_eq!(html.matches("Não há pedidos para este dia.").count(), 6);
    }

    #[test]
    fn unknown_placeholders_are_left_alone() {
        let filled = fill_template("a {{X}} b {{Y}} c {{", &[("Y", "y")]);
        assert_eq!(filled, "a {{X}} b y c {{");
    }

    #[test]
    fn missing_bucket_is_an_error() {
        let mut view = view_with(&[]);
        if let Some(board) = view.board.as_mut() {
            board.buckets.remove(&WeekDay::Friday);
        }
        let err = render_index(&view, 1, now()).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
