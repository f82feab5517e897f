//! Inline Stylesheet
//!
//! レポートに埋め込むCSS。外部ファイルに依存しない単一のHTMLにするため、
//! `<style>`要素としてそのまま出力します。

pub(crate) const STYLESHEET: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body {
    font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
    background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
    padding: 40px 20px;
    min-height: 100vh;
}
.container {
    max-width: 1000px;
    margin: 0 auto;
    background: white;
    border-radius: 12px;
    box-shadow: 0 10px 40px rgba(0, 0, 0, 0.2);
    overflow: hidden;
}
.header {
    background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
    color: white;
    padding: 40px;
    text-align: center;
}
.header h1 { font-size: 2.5em; margin-bottom: 10px; }
.header p { font-size: 1.1em; opacity: 0.9; }
.content { padding: 40px; }
.info-timestamp {
    text-align: right;
    color: #666;
    font-size: 0.9em;
    margin-bottom: 30px;
    padding-bottom: 20px;
    border-bottom: 2px solid #eee;
}
.grid {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(300px, 1fr));
    gap: 20px;
    margin-bottom: 30px;
}
.card {
    background: #f8f9fa;
    border-left: 4px solid #667eea;
    padding: 20px;
    border-radius: 8px;
    transition: transform 0.2s, box-shadow 0.2s;
}
.card:hover { transform: translateY(-5px); box-shadow: 0 5px 15px rgba(102, 126, 234, 0.2); }
.card-label {
    font-size: 0.9em;
    color: #666;
    margin-bottom: 8px;
    text-transform: uppercase;
    font-weight: 600;
    letter-spacing: 0.5px;
}
.card-value { font-size: 1.8em; color: #667eea; font-weight: bold; margin-bottom: 8px; }
.card-source { font-size: 0.85em; color: #999; }
.section-title { margin-top: 40px; margin-bottom: 20px; color: #333; }
table { width: 100%; border-collapse: collapse; margin-top: 20px; }
th {
    background: #f0f0f0;
    padding: 12px;
    text-align: left;
    font-weight: 600;
    color: #333;
    border-bottom: 2px solid #ddd;
}
td { padding: 12px; border-bottom: 1px solid #eee; }
tr:hover { background: #fafafa; }
.footer {
    background: #f8f9fa;
    padding: 20px 40px;
    text-align: center;
    color: #666;
    font-size: 0.9em;
    border-top: 1px solid #eee;
}
"#;
