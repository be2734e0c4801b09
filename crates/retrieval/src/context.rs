//! Context assembly: brochure text and product blocks under a word budget.

use crate::enrich::EnrichedProduct;
use crate::semantic::Chunk;

const BROCHURE_HEADER: &str = "== BROCHURE CONTEXT ==";
const PRODUCT_HEADER: &str = "== PRODUCT METADATA ==";
const MISSING: &str = "N/A";

/// The bounded context handed to the answer prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBundle {
    pub text: String,
    /// Words in `text`
    pub word_count: usize,
    pub truncated: bool,
}

/// Builds the context block and enforces the word budget.
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    max_words: usize,
}

impl ContextAssembler {
    pub fn new(max_words: usize) -> Self {
        Self { max_words }
    }

    pub fn assemble(&self, chunks: &[Chunk], products: &[EnrichedProduct]) -> ContextBundle {
        let brochure = chunks
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let blocks = products
            .iter()
            .map(format_product)
            .collect::<Vec<_>>()
            .join("\n");

        let full = format!("{BROCHURE_HEADER}\n{brochure}\n\n{PRODUCT_HEADER}\n{blocks}");
        let (text, truncated) = truncate_words(&full, self.max_words);

        if truncated {
            tracing::info!(max_words = self.max_words, "Context truncated to word budget");
        }

        ContextBundle {
            word_count: text.split_whitespace().count(),
            text,
            truncated,
        }
    }
}

/// Render one product as a markdown block. Each line ends with two spaces
/// (a markdown line break); URL and thumbnail lines appear only when known.
pub fn format_product(product: &EnrichedProduct) -> String {
    let record = &product.record;
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| MISSING.to_string());

    let mut block = format!(
        "**Product**: {}  \n**SKU**: {}  \n**Collection**: {}  \n**Color**: {}  \n**Construction**: {}  \n**Backing**: {}  \n",
        field(&record.style_name),
        record.sku,
        field(&record.collection_name),
        field(&record.marketing_color_name),
        field(&record.construction),
        field(&record.backing_description),
    );
    if let Some(url) = &product.product_url {
        block.push_str(&format!("**URL**: {}  \n", url));
    }
    if let Some(thumb) = &product.thumb_image {
        block.push_str(&format!("![thumb]({})  \n", thumb));
    }
    block
}

/// Keep the first `max_words` whitespace-separated words, joined by single
/// spaces. Text within budget is returned unchanged.
pub fn truncate_words(text: &str, max_words: usize) -> (String, bool) {
    let mut words = text.split_whitespace();
    let kept: Vec<&str> = words.by_ref().take(max_words).collect();

    if words.next().is_none() {
        (text.to_string(), false)
    } else {
        (kept.join(" "), true)
    }
}
