use super::escape_html;

/// Everything needed to lay out the results document.
pub struct ResultsPage<'a> {
    pub destination: &'a str,
    pub username: &'a str,
    pub plan_fragments: &'a [String],
    pub load_more_visible: bool,
}

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css" rel="stylesheet"/>
  <link href="https://cdn.jsdelivr.net/npm/bootstrap-icons@1.11.3/font/bootstrap-icons.min.css" rel="stylesheet"/>
"#;

const TAIL: &str = r#"<script src="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/js/bootstrap.bundle.min.js"></script>
<script>
  document.querySelectorAll('[data-bs-toggle="tooltip"]').forEach(function (el) {
    new bootstrap.Tooltip(el);
  });
  var toTop = document.getElementById("scroll-to-top");
  window.addEventListener("scroll", function () {
    toTop.style.display = window.scrollY > 200 ? "block" : "none";
  });
  toTop.addEventListener("click", function () {
    window.scrollTo({ top: 0, behavior: "smooth" });
  });
</script>
</body>
</html>
"#;

fn navbar(out: &mut String, username: &str) {
    out.push_str("<nav class=\"navbar navbar-expand-lg bg-body-tertiary mb-3\">\n  <div class=\"container\">\n");
    out.push_str("    <a class=\"navbar-brand\" href=\"/\">Vacation Planner</a>\n");
    out.push_str(&format!(
        "    <a class=\"nav-link\" id=\"user-profile\" href=\"/v1/profile\">{}</a>\n",
        escape_html(username)
    ));
    out.push_str("  </div>\n</nav>\n");
}

pub fn render_results_page(page: &ResultsPage<'_>) -> String {
    let mut out = String::from(HEAD);
    out.push_str(&format!(
        "  <title>{} | Vacation Planner</title>\n</head>\n<body>\n",
        escape_html(page.destination)
    ));
    navbar(&mut out, page.username);

    out.push_str("<main class=\"container\">\n");
    out.push_str(&format!(
        "<h1 class=\"h3 mb-3\" id=\"travel-destination\">{}</h1>\n",
        escape_html(page.destination)
    ));
    out.push_str("<div class=\"accordion\" id=\"plans\">\n");
    for fragment in page.plan_fragments {
        out.push_str(fragment);
    }
    out.push_str("</div>\n");

    let hidden = if page.load_more_visible {
        ""
    } else {
        " style=\"display: none\""
    };
    out.push_str(&format!(
        "<div class=\"d-grid my-3\"><button id=\"load-more-btn\" type=\"button\" class=\"btn btn-outline-primary\"{hidden}>load more</button></div>\n"
    ));
    out.push_str("</main>\n");
    out.push_str("<button id=\"scroll-to-top\" type=\"button\" class=\"btn btn-primary position-fixed bottom-0 end-0 m-3\" style=\"display: none\" title=\"back to top\"><i class=\"bi bi-arrow-up\"></i></button>\n");
    out.push_str(TAIL);
    out
}

pub struct ProfilePage<'a> {
    pub username: &'a str,
    pub most_searched: Option<&'a str>,
    pub card_fragments: &'a [String],
    pub shown: usize,
}

pub fn render_profile_page(page: &ProfilePage<'_>) -> String {
    let mut out = String::from(HEAD);
    out.push_str(&format!(
        "  <title>{} | Vacation Planner</title>\n</head>\n<body>\n",
        escape_html(page.username)
    ));
    navbar(&mut out, page.username);

    out.push_str("<main class=\"container\">\n");
    if let Some(place) = page.most_searched {
        out.push_str(&format!(
            "<div class=\"card mb-3\" id=\"most-searched-place\" style=\"max-width: 350px;\"><div class=\"card-body\"><h5 class=\"card-title\">Most searched</h5><p class=\"card-text\">{}</p></div></div>\n",
            escape_html(place)
        ));
    }
    out.push_str("<div id=\"cards\">\n");
    for card in page.card_fragments {
        out.push_str(card);
    }
    out.push_str("</div>\n");
    if page.card_fragments.len() > page.shown {
        out.push_str("<button id=\"load-more-plans-btn\" type=\"button\" class=\"btn btn-outline-primary\">load more</button>\n");
    }
    out.push_str("</main>\n");
    out.push_str("<button id=\"scroll-to-top\" type=\"button\" class=\"btn btn-primary position-fixed bottom-0 end-0 m-3\" style=\"display: none\" title=\"back to top\"><i class=\"bi bi-arrow-up\"></i></button>\n");
    out.push_str(TAIL);
    out
}
