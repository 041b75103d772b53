use crate::news::NormalizedArticle;

/// An article as the page shows it.
#[derive(Debug, Clone)]
pub struct ArticleView {
    pub title: String,
    pub description: String,
    pub link: String,
    pub image: Option<String>,
    pub source_name: String,
    pub author: Option<String>,
    pub published: String,
}

impl From<&NormalizedArticle> for ArticleView {
    fn from(article: &NormalizedArticle) -> Self {
        Self {
            title: article.title.clone(),
            description: article.description.clone(),
            link: article.link.clone(),
            image: article.image.clone(),
            source_name: article.source_name.clone(),
            author: article.display_author().map(String::from),
            published: article.pub_date.format("%b %-d, %Y").to_string(),
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone)]
pub struct Page {
    pub articles: Vec<ArticleView>,
    /// 1-based
    pub number: usize,
    pub total_pages: usize,
    pub total_matches: usize,
}

impl Page {
    pub fn has_prev(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }
}

/// Case-insensitive substring match over title, description and source.
pub fn matches_query(article: &NormalizedArticle, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    [&article.title, &article.description, &article.source_name]
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
}

/// Filter by `query` and cut out page `page`. Out-of-range pages clamp.
pub fn paginate(
    articles: &[NormalizedArticle],
    query: &str,
    page: usize,
    page_size: usize,
) -> Page {
    let page_size = page_size.max(1);
    let matching: Vec<&NormalizedArticle> =
        articles.iter().filter(|a| matches_query(a, query)).collect();

    let total_matches = matching.len();
    let total_pages = total_matches.div_ceil(page_size).max(1);
    let number = page.clamp(1, total_pages);

    let articles = matching
        .into_iter()
        .skip((number - 1) * page_size)
        .take(page_size)
        .map(ArticleView::from)
        .collect();

    Page {
        articles,
        number,
        total_pages,
        total_matches,
    }
}
