//! Sample widget markup in the shapes the locator recognizes.

use quickview_dom::ElementSpec;

fn step(title: &str) -> ElementSpec {
    ElementSpec::new("div")
        .class("single_component")
        .child(ElementSpec::new("h4").class("title").text(title))
}

/// A radio without a `value` attribute, labelled by its wrapping `<label>`.
fn bare_radio(name: &str, label: &str) -> ElementSpec {
    ElementSpec::new("label")
        .text(label)
        .child(ElementSpec::new("input").attr("type", "radio").attr("name", name))
}

fn select(name: &str, options: &[&str]) -> ElementSpec {
    ElementSpec::new("select")
        .attr("name", name)
        .children(options.iter().map(|text| ElementSpec::new("option").text(*text)))
}

/// Addify-style widget with count, build strategy and bundle steps.
///
/// The widget pre-selects defaults (second count option, the pre-designed
/// strategy) the way the real one does.
pub fn configurator() -> ElementSpec {
    let mut count = select("count", &["8-SKU-HARDWARE-KIT", "12-SKU-HARDWARE-KIT", "16"]);
    count.children[1].selected = true;

    let mut strategy = step("Build Strategy")
        .child(bare_radio("strategy", "Custom Build"))
        .child(bare_radio("strategy", "Pre-designed"));
    strategy.children[2].children[0].checked = true;

    ElementSpec::new("form").class("cart").child(
        ElementSpec::new("div")
            .class("af_cp_all_components_content")
            .child(step("Select SKU count").child(count))
            .child(strategy)
            .child(
                step("Choose your complete bundle")
                    .child(select("mount", &["Wall Mount", "Desk Mount"]))
                    .child(select("finish", &["Walnut", "Matte Black"]))
                    .child(
                        ElementSpec::new("div")
                            .class("af-cp-selected-product")
                            .text("Wall Mount"),
                    )
                    .child(
                        ElementSpec::new("input")
                            .attr("type", "hidden")
                            .attr("name", "af_cp_selected_bundle")
                            .attr("value", "42"),
                    ),
            ),
    )
    .child(
        ElementSpec::new("input")
            .attr("type", "hidden")
            .attr("name", "add-to-cart")
            .attr("value", "1234"),
    )
}

/// Legacy markup: one `[data-component]` step per choice, radios only.
pub fn legacy_configurator() -> ElementSpec {
    let component = |name: &str, title: &str, choices: &[(&str, &str)]| {
        ElementSpec::new("div")
            .class("cpb-component")
            .attr("data-component", name)
            .child(ElementSpec::new("h4").text(title))
            .children(
                choices
                    .iter()
                    .map(|(value, label)| ElementSpec::radio(name, value, label)),
            )
    };

    ElementSpec::new("div")
        .children([
            component("sku-count", "How many SKUs?", &[("16", "16 SKUs"), ("24", "24 SKUs")]),
            component("build-strategy", "Strategy", &[("custom", "Custom"), ("predesigned", "Ready made")]),
            component("mount-type", "Mount", &[("Wall Mount", "Wall"), ("Floor Stand", "Floor")]),
            component("finish-material", "Finish", &[("Walnut", "Walnut"), ("Oak", "Oak")]),
        ])
}
