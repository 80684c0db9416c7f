//! Reference tables the extraction pipeline works from.
//!
//! Nothing in the crate reaches for these tables globally: a [`Vocabulary`]
//! value is built once and handed to every component that needs it.

/// Garment terms grouped the way the parser reports them.
#[derive(Debug, Clone)]
pub struct GarmentTaxonomy {
    pub tops: Vec<String>,
    pub bottoms: Vec<String>,
    pub dresses: Vec<String>,
    pub outerwear: Vec<String>,
    pub shoes: Vec<String>,
    pub accessories: Vec<String>,
}

impl GarmentTaxonomy {
    /// All garment terms, category by category.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.tops
            .iter()
            .chain(&self.bottoms)
            .chain(&self.dresses)
            .chain(&self.outerwear)
            .chain(&self.shoes)
            .chain(&self.accessories)
            .map(String::as_str)
    }

}

#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Canonical spelling of every public figure the pipeline may attribute.
    pub celebrities: Vec<String>,
    /// Names rare enough to match by loose substring.
    pub distinctive_names: Vec<String>,
    pub garments: GarmentTaxonomy,
    /// Color names, multi-word entries included ("forest green").
    pub colors: Vec<String>,
    pub patterns: Vec<String>,
    pub styles: Vec<String>,
    pub fits: Vec<String>,
    pub fabrics: Vec<String>,
    /// "was seen wearing" style verbs and phrases.
    pub action_words: Vec<String>,
    /// Words pointing at outfit talk ("outfit", "wore", "look").
    pub outfit_keywords: Vec<String>,
    /// Generic merchandising words used by the product-article guard.
    pub product_words: Vec<String>,
    /// Known red-carpet events.
    pub events: Vec<String>,
}

/// Shortest single-token name matched by plain substring.
const MIN_DISTINCTIVE_CHARS: usize = 5;

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            celebrities: owned(&[
                "Zendaya",
                "Rihanna",
                "Beyoncé",
                "Taylor Swift",
                "Hailey Bieber",
                "Kendall Jenner",
                "Kylie Jenner",
                "Kim Kardashian",
                "Gigi Hadid",
                "Bella Hadid",
                "Harry Styles",
                "Timothée Chalamet",
                "Blake Lively",
                "Jennifer Lopez",
                "Jennifer Lawrence",
                "Margot Robbie",
                "Dua Lipa",
                "Lady Gaga",
                "Billie Eilish",
                "Ariana Grande",
                "Selena Gomez",
                "Katie Holmes",
                "Anne Hathaway",
                "Emma Stone",
                "Florence Pugh",
                "Sydney Sweeney",
                "Jenna Ortega",
                "Anya Taylor-Joy",
                "Olivia Rodrigo",
                "Sabrina Carpenter",
                "Victoria Beckham",
                "Meghan Markle",
                "Kate Middleton",
                "Nicole Kidman",
                "Cate Blanchett",
                "Lupita Nyong'o",
                "Tracee Ellis Ross",
                "Rosie Huntington-Whiteley",
                "Jacob Elordi",
                "Pedro Pascal",
                "Paul Mescal",
                "Austin Butler",
                "Ryan Gosling",
                "Bad Bunny",
                "A$AP Rocky",
                "Pharrell Williams",
                "Cardi B",
                "Doja Cat",
                "SZA",
                "Lizzo",
                "Cher",
                "Madonna",
                "Kendrick Lamar",
                "Jennifer Aniston",
                "Reese Witherspoon",
                "Alexa Chung",
                "Emily Ratajkowski",
                "Irina Shayk",
                "Naomi Campbell",
                "Jisoo",
                "Jennie",
            ]),
            distinctive_names: owned(&[
                "Zendaya",
                "Rihanna",
                "Beyoncé",
                "Timothée Chalamet",
                "Anya Taylor-Joy",
                "Lupita Nyong'o",
                "A$AP Rocky",
                "Rosie Huntington-Whiteley",
                "Emily Ratajkowski",
                "Jacob Elordi",
            ]),
            garments: GarmentTaxonomy {
                tops: owned(&[
                    "t-shirt",
                    "tee",
                    "shirt",
                    "blouse",
                    "tank top",
                    "crop top",
                    "top",
                    "sweater",
                    "cardigan",
                    "hoodie",
                    "sweatshirt",
                    "turtleneck",
                    "bodysuit",
                    "corset",
                    "camisole",
                    "polo",
                    "vest",
                ]),
                bottoms: owned(&[
                    "jeans",
                    "trousers",
                    "pants",
                    "shorts",
                    "skirt",
                    "miniskirt",
                    "leggings",
                    "joggers",
                    "culottes",
                ]),
                dresses: owned(&[
                    "dress",
                    "gown",
                    "minidress",
                    "maxi dress",
                    "slip dress",
                    "jumpsuit",
                    "romper",
                    "suit",
                    "tuxedo",
                ]),
                outerwear: owned(&[
                    "jacket",
                    "coat",
                    "trench coat",
                    "blazer",
                    "parka",
                    "bomber",
                    "cape",
                    "poncho",
                    "overcoat",
                ]),
                shoes: owned(&[
                    "sneakers",
                    "boots",
                    "heels",
                    "pumps",
                    "loafers",
                    "sandals",
                    "mules",
                    "flats",
                    "stilettos",
                    "platforms",
                    "slingbacks",
                ]),
                accessories: owned(&[
                    "handbag",
                    "bag",
                    "clutch",
                    "tote",
                    "belt",
                    "hat",
                    "beret",
                    "scarf",
                    "sunglasses",
                    "necklace",
                    "earrings",
                    "bracelet",
                    "gloves",
                    "headband",
                    "watch",
                ]),
            },
            colors: owned(&[
                "forest green",
                "emerald green",
                "olive green",
                "sage green",
                "mint green",
                "navy blue",
                "baby blue",
                "royal blue",
                "cobalt blue",
                "sky blue",
                "hot pink",
                "blush pink",
                "baby pink",
                "dusty rose",
                "burnt orange",
                "off white",
                "off-white",
                "jet black",
                "champagne gold",
                "light blue",
                "dark green",
                "black",
                "white",
                "red",
                "blue",
                "green",
                "yellow",
                "pink",
                "purple",
                "orange",
                "brown",
                "grey",
                "gray",
                "beige",
                "cream",
                "ivory",
                "navy",
                "burgundy",
                "maroon",
                "teal",
                "turquoise",
                "lavender",
                "lilac",
                "gold",
                "silver",
                "bronze",
                "camel",
                "tan",
                "khaki",
                "olive",
                "emerald",
                "scarlet",
                "crimson",
                "coral",
                "fuchsia",
                "magenta",
                "nude",
                "chocolate",
                "mustard",
                "rust",
            ]),
            patterns: owned(&[
                "floral",
                "striped",
                "stripes",
                "plaid",
                "checked",
                "gingham",
                "houndstooth",
                "polka dot",
                "leopard",
                "animal print",
                "zebra",
                "snakeskin",
                "paisley",
                "tie-dye",
                "camo",
                "geometric",
                "abstract",
                "sequined",
                "embroidered",
                "pinstripe",
                "argyle",
            ]),
            styles: owned(&[
                "vintage",
                "retro",
                "bohemian",
                "minimalist",
                "classic",
                "elegant",
                "casual",
                "formal",
                "sporty",
                "edgy",
                "preppy",
                "grunge",
                "streetwear",
                "glamorous",
                "chic",
                "romantic",
                "sheer",
                "metallic",
                "monochrome",
                "tailored",
                "sculptural",
                "custom",
                "couture",
            ]),
            fits: owned(&[
                "oversized",
                "fitted",
                "cropped",
                "high-waisted",
                "low-rise",
                "wide-leg",
                "slim-fit",
                "relaxed",
                "bodycon",
                "flared",
                "straight-leg",
                "baggy",
                "form-fitting",
                "plunging",
                "strapless",
                "backless",
            ]),
            fabrics: owned(&[
                "leather",
                "denim",
                "silk",
                "satin",
                "velvet",
                "lace",
                "linen",
                "cashmere",
                "wool",
                "tweed",
                "chiffon",
                "tulle",
                "suede",
                "cotton",
                "knit",
                "crochet",
                "organza",
                "sequin",
                "mesh",
                "faux fur",
            ]),
            action_words: owned(&[
                "was seen wearing",
                "was spotted wearing",
                "was photographed wearing",
                "stepped out in",
                "stepped out wearing",
                "showed up in",
                "turned heads in",
                "dazzled in",
                "stunned in",
                "wore",
                "wears",
                "wearing",
                "donned",
                "dons",
                "sported",
                "sports",
                "rocked",
                "opted for",
                "arrived in",
                "posed in",
                "paired",
                "layered",
                "styled",
                "channeled",
            ]),
            outfit_keywords: owned(&[
                "outfit",
                "wore",
                "wearing",
                "style",
                "styled",
                "look",
                "ensemble",
                "fashion",
                "dressed",
                "red carpet",
                "street style",
                "wardrobe",
            ]),
            product_words: owned(&[
                "buy",
                "shop",
                "shopping",
                "price",
                "sale",
                "deal",
                "deals",
                "discount",
                "retailer",
                "cart",
                "checkout",
                "affordable",
                "budget",
                "bestseller",
                "best-selling",
                "under $",
                "in stock",
                "sold out",
                "editor's picks",
                "our picks",
                "add to bag",
                "free shipping",
                "promo code",
                "affiliate",
                "commission",
            ]),
            events: owned(&[
                "Met Gala",
                "Oscars",
                "Academy Awards",
                "Golden Globes",
                "Grammys",
                "Emmys",
                "BAFTAs",
                "Cannes Film Festival",
                "Venice Film Festival",
                "Toronto International Film Festival",
                "Paris Fashion Week",
                "Milan Fashion Week",
                "New York Fashion Week",
                "London Fashion Week",
                "Vanity Fair Oscar Party",
                "CFDA Awards",
                "Coachella",
                "VMAs",
                "Wimbledon",
                "Super Bowl",
            ]),
        }
    }
}

impl Vocabulary {
    /// Curated names, plus single-token names long enough not to hide
    /// inside ordinary words ("Cher" in "teacher").
    pub fn is_distinctive(&self, name: &str) -> bool {
        (!name.contains(' ') && name.chars().count() >= MIN_DISTINCTIVE_CHARS)
            || self
                .distinctive_names
                .iter()
                .any(|d| d.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_token_names_are_distinctive() {
        let vocab = Vocabulary::default();
        assert!(vocab.is_distinctive("Rihanna"));
        assert!(vocab.is_distinctive("Anya Taylor-Joy"));
        assert!(!vocab.is_distinctive("Emma Stone"));
        assert!(!vocab.is_distinctive("Cher"));
        assert!(!vocab.is_distinctive("SZA"));
    }

    #[test]
    fn taxonomy_covers_every_category() {
        let vocab = Vocabulary::default();
        for term in ["blouse", "jeans", "gown", "blazer", "loafers", "clutch"] {
            assert!(vocab.garments.terms().any(|t| t == term), "missing {term}");
        }
    }
}
