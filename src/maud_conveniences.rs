use maud::{Markup, Render, html};

pub const INPUT_CLASS: &str = "shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600";

pub fn render_table<const N: usize>(titles: [&'static str; N], items: Vec<[Markup; N]>) -> Markup {
    html! {
        div class="overflow-x-auto" {
            table class="min-w-full bg-gray-800 rounded shadow-md" {
                thead class="bg-gray-700" {
                    tr {
                        @for title in titles {
                            th class="py-2 px-4 text-left font-semibold text-gray-300" {(title)}
                        }
                    }
                }
                tbody {
                    @for row in items {
                        tr {
                            @for col in row {
                                td class="py-2 px-4 border-b border-gray-600 text-gray-200" {(col)}
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn title(s: impl Render) -> Markup {
    html! {
        h1 class="text-2xl font-semibold mb-4" {(s)}
    }
}

pub fn subtitle(s: impl Render) -> Markup {
    html! {
        h2 class="text-xl font-semibold mb-2" {(s)}
    }
}

pub fn form_element(id: &'static str, label: &'static str, input: Markup) -> Markup {
    html! {
        div class="mb-4" {
            label for=(id) class="block text-sm font-bold mb-2 text-gray-300" {(label)}
            (input)
        }
    }
}

pub fn simple_form_element(
    id: &'static str,
    label: &'static str,
    input_type: &'static str,
    value: &str,
) -> Markup {
    form_element(
        id,
        label,
        html! {
            input required type=(input_type) id=(id) name=(id) value=(value) class=(INPUT_CLASS) {}
        },
    )
}

pub enum Alert {
    Success,
    Failure,
    Status,
}

pub fn alert(kind: &Alert, message: impl Render) -> Markup {
    let class = match kind {
        Alert::Success => "bg-green-100 border border-green-400 text-green-700 px-4 py-3 rounded relative mb-4",
        Alert::Failure => "bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4",
        Alert::Status => "bg-gray-700 border border-gray-600 text-gray-200 px-4 py-3 rounded relative mb-4",
    };

    html! {
        div class=(class) role="alert" {
            (message)
        }
    }
}
