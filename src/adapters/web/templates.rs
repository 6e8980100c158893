//! HTML templates using Askama.

use askama::Template;

#[derive(Template)]
#[template(
    ext = "html",
    source = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{ symbol }} price trend</title>
</head>
<body>
  <h1>{{ symbol }}</h1>
  {% match last_close %}
  {% when Some with (close) %}
  <p>Last close: {{ close }} on {{ last_date }} ({{ bars }} bars)</p>
  {% when None %}
  <p>No data loaded yet.</p>
  {% endmatch %}
  <section id="history" data-src="/data"></section>
  <section id="recent" data-src="/previous-7-days"></section>
  <section id="forecast" data-src="/predict"></section>
  <button id="refresh" data-src="/fetch-data">Fetch latest data</button>
</body>
</html>
"#
)]
pub struct DashboardTemplate<'a> {
    pub symbol: &'a str,
    pub bars: usize,
    pub last_date: String,
    pub last_close: Option<f64>,
}
