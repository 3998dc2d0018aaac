/// Small presentational pieces of the popup

use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct CountLabelProps {
    pub label: String,
}

#[function_component(CountLabel)]
pub fn count_label(props: &CountLabelProps) -> Html {
    html! {
        <span id="count-label" class="count-label">{&props.label}</span>
    }
}

#[derive(Properties, PartialEq)]
pub struct EmptyStateProps {
    pub message: String,
    #[prop_or_default]
    pub hint: Option<String>,
}

#[function_component(EmptyState)]
pub fn empty_state(props: &EmptyStateProps) -> Html {
    html! {
        <div id="empty-state" class="empty-state">
            <p>{&props.message}</p>
            if let Some(hint) = &props.hint {
                <p class="empty-state-hint">{hint}</p>
            }
        </div>
    }
}
