use axum::response::Html;

const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>CareBridge AI</title>
</head>
<body style="background:#0f172a;color:white;height:100vh;margin:0;display:flex;justify-content:center;align-items:center;font-family:sans-serif">
  <div style="text-align:center">
    <h1>CareBridge AI</h1>
    <p>Accessibility First Health Risk Analyzer</p>
    <a href="https://anshkunj.github.io/Carebridge-AI"
       style="padding:14px 28px;background:#38bdf8;color:black;text-decoration:none;border-radius:12px;font-weight:bold;display:inline-block;margin-top:20px">
      Open CareBridge Frontend
    </a>
  </div>
</body>
</html>
"#;

/// GET /
pub async fn landing_handler() -> Html<&'static str> {
    Html(LANDING_PAGE)
}
