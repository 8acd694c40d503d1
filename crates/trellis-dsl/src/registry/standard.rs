use super::{ComponentRegistry, ComponentSpec, PropSpec};

const GAPS: &[&str] = &["sm", "md", "lg"];

/// The fixed component library shipped with Trellis
pub(super) fn standard_registry() -> ComponentRegistry {
    ComponentRegistry::new(vec![
        ComponentSpec::new("Button", "A clickable button")
            .prop(PropSpec::string("children").required().describe("Button label text"))
            .prop(PropSpec::one_of("variant", &["primary", "secondary", "outline", "danger"]).default_value("primary"))
            .prop(PropSpec::one_of("size", &["sm", "md", "lg"]).default_value("md"))
            .prop(PropSpec::boolean("disabled").default_value(false))
            .prop(PropSpec::string("onClick").describe("What happens when clicked (just a description)")),
        ComponentSpec::new("Card", "A container with a border and padding, used to group related content")
            .prop(PropSpec::string("title").describe("Card header title"))
            .prop(PropSpec::node("children").required().describe("Content inside the card")),
        ComponentSpec::new("Input", "A text input field")
            .prop(PropSpec::string("label").describe("Label above the input"))
            .prop(PropSpec::string("placeholder").describe("Placeholder text"))
            .prop(PropSpec::one_of("type", &["text", "email", "password", "number", "search"]).default_value("text"))
            .prop(PropSpec::boolean("disabled").default_value(false)),
        ComponentSpec::new("Table", "A data table that shows rows and columns")
            .prop(PropSpec::array_of("columns", "string").required().describe("Column header names"))
            .prop(PropSpec::array_of("rows", "array").required().describe("2D array of cell values")),
        ComponentSpec::new("Modal", "A popup dialog/overlay")
            .prop(PropSpec::string("title").required().describe("Modal title"))
            .prop(PropSpec::boolean("isOpen").default_value(true))
            .prop(PropSpec::node("children").required().describe("Content inside the modal")),
        ComponentSpec::new("Sidebar", "A vertical navigation panel on the left side")
            .prop(PropSpec::array_of("items", "object").required().describe("Array of {label, icon} objects"))
            .prop(PropSpec::string("activeItem").describe("Currently active item label")),
        ComponentSpec::new("Navbar", "A horizontal navigation bar at the top")
            .prop(PropSpec::string("brand").describe("Brand/logo text"))
            .prop(PropSpec::array_of("items", "string").describe("Navigation link labels")),
        ComponentSpec::new("Typography", "Text element for headings and body text")
            .prop(PropSpec::one_of("variant", &["h1", "h2", "h3", "h4", "body", "caption"]).default_value("body"))
            .prop(PropSpec::string("children").required().describe("The text content")),
        ComponentSpec::new("Chart", "A simple chart/graph (uses mocked data)")
            .prop(PropSpec::one_of("type", &["bar", "line", "pie"]).default_value("bar"))
            .prop(PropSpec::string("title").describe("Chart title"))
            .prop(PropSpec::array_of("data", "object").describe(
                "Array of objects. Each object MUST have 'label' (string) and 'value' (number). Example: [{'label': 'A', 'value': 10}]",
            )),
        ComponentSpec::new("Image", "An image placeholder")
            .prop(
                PropSpec::string("src")
                    .default_value("https://placehold.co/600x400")
                    .describe("Image URL (e.g. 'https://placehold.co/600x400')"),
            )
            .prop(PropSpec::string("alt").required().describe("Alt text for the image"))
            .prop(PropSpec::string("width").default_value("100%").describe("Width of the image"))
            .prop(PropSpec::string("height").default_value("auto").describe("Height of the image")),
        ComponentSpec::new("Alert", "A notification/alert banner")
            .prop(PropSpec::string("message").required().describe("Alert message"))
            .prop(PropSpec::one_of("type", &["info", "success", "warning", "error"]).default_value("info")),
        ComponentSpec::new("Flex", "A flexbox layout container to arrange children horizontally or vertically")
            .prop(PropSpec::one_of("direction", &["row", "column"]).default_value("row"))
            .prop(PropSpec::one_of("gap", GAPS).default_value("md"))
            .prop(PropSpec::one_of("align", &["start", "center", "end", "stretch"]).default_value("stretch"))
            .prop(PropSpec::one_of("justify", &["start", "center", "end", "between", "around"]).default_value("start"))
            .prop(PropSpec::boolean("wrap").default_value(false))
            .prop(PropSpec::node("children").required()),
        ComponentSpec::new("Grid", "A CSS grid layout container")
            .prop(PropSpec::number("columns").default_value(2).describe("Number of columns"))
            .prop(PropSpec::one_of("gap", GAPS).default_value("md"))
            .prop(PropSpec::node("children").required()),
        ComponentSpec::new("Container", "A centered content wrapper with max-width")
            .prop(PropSpec::node("children").required()),
    ])
}
