//! Page Size Selector Component

use leptos::prelude::*;

/// `<select>` over a fixed list of page sizes
#[component]
pub fn PageSizeSelector(
    options: &'static [usize],
    #[prop(into)] value: Signal<usize>,
    #[prop(into)] on_change: Callback<usize>,
    #[prop(into, optional)] label: Option<String>,
) -> impl IntoView {
    let label = label.unwrap_or_else(|| "Itens por página:".to_string());

    view! {
        <label class="page-size-selector">
            <span>{label}</span>
            <select on:change=move |ev| {
                if let Ok(size) = event_target_value(&ev).parse::<usize>() {
                    on_change.run(size);
                }
            }>
                {options
                    .iter()
                    .map(|&option| {
                        view! {
                            <option value=option.to_string() selected=move || value.get() == option>
                                {option}
                            </option>
                        }
                    })
                    .collect_view()}
            </select>
        </label>
    }
}
