//! Minimal HTML bodies for the form routes.

const PAGE_STYLE: &str = "body{font-family:Arial,sans-serif;max-width:600px;margin:50px auto;\
padding:20px;text-align:center}.box{border-radius:5px;padding:20px;margin:20px 0}\
.error{background:#ffe6e6;border:1px solid #ff4444}.error h2{color:#cc0000;margin-top:0}\
.notice{background:#e6f4ea;border:1px solid #34a853}.notice h2{color:#1e7e34;margin-top:0}\
a{display:inline-block;margin-top:20px;padding:10px 20px;background:#007bff;color:#fff;\
text-decoration:none;border-radius:4px}a:hover{background:#0056b3}";

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(class: &str, title: &str, message: &str, link_href: &str, link_text: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title>\
         <style>{style}</style></head><body><div class=\"box {class}\"><h2>{title}</h2>\
         <p>{message}</p></div><a href=\"{href}\">{link}</a></body></html>",
        title = escape_html(title),
        style = PAGE_STYLE,
        class = class,
        message = escape_html(message),
        href = link_href,
        link = escape_html(link_text),
    )
}

/// Error page with a "Go Back" link.
pub fn error_page(message: &str) -> String {
    page("error", "Error", message, "javascript:history.back()", "Go Back")
}

pub fn notice_page(title: &str, message: &str, continue_to: &str) -> String {
    page("notice", title, message, continue_to, "Continue")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_escaped() {
        let html = error_page("<script>alert('x')</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(html.contains("Go Back"));
    }

    #[test]
    fn notice_links_onward() {
        let html = notice_page("Code sent", "Check your inbox.", "/verify.html");
        assert!(html.contains("href=\"/verify.html\""));
        assert!(html.contains("Check your inbox."));
    }
}
