//! HTML 頁面樣板與靜態資源

/// 需要下載的外部資源：(檔名, 下載網址)
pub const REMOTE_ASSETS: [(&str, &str); 4] = [
    (
        "main_style.css",
        "https://raw.githubusercontent.com/sindresorhus/github-markdown-css/main/github-markdown.css",
    ),
    (
        "hljs_style.css",
        "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/styles/github.min.css",
    ),
    (
        "highlight.min.js",
        "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/highlight.min.js",
    ),
    (
        "clipboard.min.js",
        "https://cdnjs.cloudflare.com/ajax/libs/clipboard.js/2.0.11/clipboard.min.js",
    ),
];

pub const CUSTOM_CSS_FILE: &str = "custom.css";

const STYLESHEETS: [&str; 3] = ["main_style.css", "hljs_style.css", CUSTOM_CSS_FILE];
const SCRIPTS: [&str; 2] = ["highlight.min.js", "clipboard.min.js"];

pub const CUSTOM_CSS: &str = r#"body {
    background-color: #f6f8fa;
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif, "Apple Color Emoji", "Segoe UI Emoji";
}
.markdown-body {
    box-sizing: border-box;
    min-width: 200px;
    max-width: 980px;
    margin: 0 auto;
    padding: 45px;
    background-color: #ffffff;
    border: 1px solid #e1e4e8;
    border-radius: 6px;
}
pre {
    position: relative;
}
.copy-btn {
    position: absolute;
    top: 8px;
    right: 8px;
    background-color: #e1e4e8;
    border: 1px solid #d1d5da;
    border-radius: 6px;
    padding: 3px 8px;
    font-size: 12px;
    cursor: pointer;
    opacity: 0;
    transition: opacity 0.2s ease-in-out;
}
pre:hover .copy-btn {
    opacity: 1;
}
.copy-btn:hover {
    background-color: #d1d5da;
}
@media (max-width: 767px) {
    .markdown-body {
        padding: 15px;
    }
}
"#;

const PAGE_SCRIPT: &str = r"<script>
    document.addEventListener('DOMContentLoaded', () => {
        hljs.highlightAll();

        document.querySelectorAll('pre code').forEach((codeBlock) => {
            const pre = codeBlock.parentNode;
            const button = document.createElement('button');
            button.className = 'copy-btn';
            button.type = 'button';
            button.innerText = '複製';
            pre.style.position = 'relative';
            pre.appendChild(button);
        });

        const clipboard = new ClipboardJS('.copy-btn', {
            target: (trigger) => trigger.previousElementSibling,
        });

        const resetLater = (trigger) => {
            setTimeout(() => { trigger.innerText = '複製'; }, 2000);
        };

        clipboard.on('success', (e) => {
            e.clearSelection();
            e.trigger.innerText = '已複製!';
            resetLater(e.trigger);
        });

        clipboard.on('error', (e) => {
            e.trigger.innerText = '失敗!';
            resetLater(e.trigger);
        });
    });
    </script>";

/// 將 pandoc 產生的 HTML 片段包成完整頁面
#[must_use]
pub fn render_page(title: &str, body: &str) -> String {
    let css_links: String = STYLESHEETS
        .iter()
        .map(|href| format!("    <link rel=\"stylesheet\" href=\"{href}\">\n"))
        .collect();
    let js_scripts: String = SCRIPTS
        .iter()
        .map(|src| format!("    <script src=\"{src}\"></script>\n"))
        .collect();
    let title = escape_html(title);

    format!(
        "<!DOCTYPE html>
<html lang=\"zh-Hant\">
<head>
    <meta charset=\"UTF-8\">
    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">
    <title>{title}</title>
{css_links}</head>
<body>
    <main class=\"markdown-body\">
{body}
    </main>
{js_scripts}    {PAGE_SCRIPT}
</body>
</html>
"
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_page_structure() {
        let page = render_page("L0001_兩數之和", "<h1>標題</h1>");

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>L0001_兩數之和</title>"));
        assert!(page.contains("<h1>標題</h1>"));
        assert!(page.contains("href=\"custom.css\""));
        assert!(page.contains("src=\"clipboard.min.js\""));
        assert!(page.contains("hljs.highlightAll()"));
    }

    #[test]
    fn test_title_is_escaped() {
        let page = render_page("a<b>", "");
        assert!(page.contains("<title>a&lt;b&gt;</title>"));
    }

    #[test]
    fn test_scripts_follow_body() {
        let page = render_page("t", "<p>body</p>");
        let body_at = page.find("<p>body</p>").unwrap();
        let script_at = page.find("highlight.min.js").unwrap();
        assert!(script_at > body_at);
    }
}
