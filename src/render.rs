//! Server-side HTML for the shell and its screens.

use leptos::ssr::render_to_string;
use leptos::{component, view, CollectView, IntoView};

use crate::expiry::Badge;
use crate::views::{
    DashboardView, ExpiryView, MovementRow, MovementsView, ProductOption, ProductRow,
    ProductsView, View, ViewSnapshot,
};

const STYLE: &str = "body{margin:0;display:flex;font-family:sans-serif}\
    nav{width:200px;min-height:100vh;background:#001529;padding:16px}\
    nav .brand{color:#475c3f;font-weight:bold;font-size:24px;text-align:center}\
    nav a{display:block;color:#ccc;padding:8px;text-decoration:none}\
    nav a.active{background:#1677ff;color:#fff}\
    main{flex:1;padding:16px}table{border-collapse:collapse;margin-bottom:24px}\
    td,th{border:1px solid #ddd;padding:4px 8px}\
    .tag{padding:2px 6px;border-radius:4px;color:#fff}\
    .hero a{background:#1677ff;color:#fff;padding:6px 12px;border-radius:6px;text-decoration:none}\
    .toast{background:#fff1f0;border:1px solid #ffa39e;padding:8px}";

/// Full page: side menu, header and the rendered screen (or a notification
/// when it failed to load).
pub fn page(selected: View, content: Result<&ViewSnapshot, &str>) -> String {
    let content = content.cloned().map_err(str::to_string);
    let html = render_to_string(move || {
        view! {
            <html lang="es">
                <head>
                    <meta charset="utf-8"/>
                    <title>"FRUTEX"</title>
                    <style>{STYLE}</style>
                </head>
                <body>
                    <Menu selected=selected/>
                    <main>
                        <h1>{selected.title()}</h1>
                        {match content {
                            Ok(snapshot) => screen(snapshot),
                            Err(message) => view! { <div class="toast">{message}</div> }.into_view(),
                        }}
                    </main>
                </body>
            </html>
        }
    });
    format!("<!DOCTYPE html>\n{}", html)
}

fn screen(snapshot: ViewSnapshot) -> leptos::View {
    match snapshot {
        ViewSnapshot::Dashboard(model) => view! { <DashboardScreen model=model/> }.into_view(),
        ViewSnapshot::Productos(model) => view! { <ProductsScreen model=model/> }.into_view(),
        ViewSnapshot::Entradas(model) | ViewSnapshot::Salidas(model) => {
            view! { <MovementsScreen model=model/> }.into_view()
        }
        ViewSnapshot::Caducidad(model) => view! { <ExpiryScreen model=model/> }.into_view(),
    }
}

#[component]
fn Menu(selected: View) -> impl IntoView {
    view! {
        <nav>
            <div class="brand">"FRUTEX"</div>
            {View::menu()
                .into_iter()
                .map(|item| {
                    view! {
                        <a href=format!("/?view={}", item) class:active={item == selected}>
                            {item.title()}
                        </a>
                    }
                })
                .collect_view()}
        </nav>
    }
}

#[component]
fn StatusTag(badge: Badge) -> impl IntoView {
    view! {
        <span class="tag" style=format!("background:{}", badge.color)>{badge.label}</span>
    }
}

#[component]
fn MovementTable(rows: Vec<MovementRow>) -> impl IntoView {
    view! {
        <table>
            <thead>
                <tr>
                    <th>"ID"</th>
                    <th>"Producto"</th>
                    <th>"Cantidad"</th>
                    <th>"Fecha"</th>
                </tr>
            </thead>
            <tbody>
                {rows
                    .into_iter()
                    .map(|row| {
                        view! {
                            <tr>
                                <td>{row.movement.id}</td>
                                <td>{row.product}</td>
                                <td>{row.movement.quantity}</td>
                                <td>{row.movement.timestamp.format("%Y-%m-%d %H:%M").to_string()}</td>
                            </tr>
                        }
                    })
                    .collect_view()}
            </tbody>
        </table>
    }
}

#[component]
fn ExpiryTable(rows: Vec<ProductRow>, with_price: bool) -> impl IntoView {
    view! {
        <table>
            <thead>
                <tr>
                    <th>"ID"</th>
                    <th>"Nombre"</th>
                    {with_price.then(|| view! { <th>"Precio"</th> })}
                    <th>"Stock"</th>
                    <th>"Caducidad"</th>
                </tr>
            </thead>
            <tbody>
                {rows
                    .into_iter()
                    .map(|row| {
                        let price = with_price.then(|| format!("{:.2}", row.product.price));
                        view! {
                            <tr>
                                <td>{row.product.id}</td>
                                <td>{row.product.name}</td>
                                {price.map(|price| view! { <td>{price}</td> })}
                                <td>{row.product.stock}</td>
                                <td><StatusTag badge=row.badge/></td>
                            </tr>
                        }
                    })
                    .collect_view()}
            </tbody>
        </table>
    }
}

#[component]
fn DashboardScreen(model: DashboardView) -> impl IntoView {
    view! {
        <section class="hero">
            <h2>"Bienvenido a FRUTEX"</h2>
            <p>"Control rápido de inventario, caducidad y movimientos."</p>
            <a href=format!("/?view={}", View::Productos)>"+ Ir a productos"</a>
        </section>
        <ul>
            <li>"Total Stock: "<b>{model.total_stock}</b></li>
            <li>"Productos por caducar: "<b>{model.near_expiry_count}</b></li>
            <li>"Productos caducados: "<b>{model.expired_count}</b></li>
            <li>"Entradas recientes: "<b>{model.entradas_count}</b></li>
            <li>"Salidas recientes: "<b>{model.salidas_count}</b></li>
        </ul>
        <h2>"Últimas Entradas"</h2>
        <MovementTable rows=model.recent_entradas/>
        <h2>"Últimas Salidas"</h2>
        <MovementTable rows=model.recent_salidas/>
        <h2>"Productos por caducar en los próximos 7 días"</h2>
        <ExpiryTable rows=model.near_expiry with_price=false/>
        <h2>"Productos ya caducados"</h2>
        <ExpiryTable rows=model.expired with_price=false/>
    }
}

#[component]
fn ProductsScreen(model: ProductsView) -> impl IntoView {
    view! {
        <table>
            <thead>
                <tr>
                    <th>"ID"</th>
                    <th>"Nombre"</th>
                    <th>"Precio"</th>
                    <th>"Stock"</th>
                    <th>"Caducidad"</th>
                </tr>
            </thead>
            <tbody>
                {model
                    .products
                    .into_iter()
                    .map(|product| {
                        view! {
                            <tr>
                                <td>{product.id}</td>
                                <td>{product.name}</td>
                                <td>{format!("{:.2}", product.price)}</td>
                                <td>{product.stock}</td>
                                <td>{product.expiration_date.unwrap_or_default()}</td>
                            </tr>
                        }
                    })
                    .collect_view()}
            </tbody>
        </table>
    }
}

/// Movement history plus the stock each product can give out.
#[component]
fn MovementsScreen(model: MovementsView) -> impl IntoView {
    view! {
        <MovementTable rows=model.movements/>
        <h2>"Stock disponible"</h2>
        <StockTable options=model.products/>
    }
}

#[component]
fn StockTable(options: Vec<ProductOption>) -> impl IntoView {
    view! {
        <table>
            <thead>
                <tr>
                    <th>"ID"</th>
                    <th>"Producto"</th>
                    <th>"Stock"</th>
                </tr>
            </thead>
            <tbody>
                {options
                    .into_iter()
                    .map(|option| {
                        view! {
                            <tr>
                                <td>{option.id}</td>
                                <td>{option.name}</td>
                                <td>{option.stock}</td>
                            </tr>
                        }
                    })
                    .collect_view()}
            </tbody>
        </table>
    }
}

#[component]
fn ExpiryScreen(model: ExpiryView) -> impl IntoView {
    view! { <ExpiryTable rows=model.products with_price=true/> }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expiry::ExpiryStatus;
    use crate::models::Product;
    use chrono::NaiveDate;

    /// The `<a …>` tag of the menu entry for `view`.
    fn menu_link(html: &str, view: View) -> String {
        let href = format!("href=\"/?view={}\"", view);
        html.split("<a ")
            .find(|tag| tag.contains(&href))
            .and_then(|tag| tag.split('>').next())
            .unwrap_or_default()
            .to_string()
    }

    fn expiry_page() -> String {
        let row = ProductRow {
            product: Product {
                expiration_date: Some("2026-10-18".into()),
                ..Product::new(1, "Fresa <bio>", 2.0, 3)
            },
            effective_expiration: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            status: ExpiryStatus::Near,
            badge: ExpiryStatus::Near.badge(),
        };
        let snapshot = ViewSnapshot::Caducidad(ExpiryView { products: vec![row] });
        page(View::Caducidad, Ok(&snapshot))
    }

    #[test]
    fn page_marks_selected_menu_entry() {
        let snapshot = ViewSnapshot::Productos(ProductsView { products: vec![], count: 0 });
        let html = page(View::Productos, Ok(&snapshot));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(menu_link(&html, View::Productos).contains("active"));
        assert!(!menu_link(&html, View::Salidas).contains("active"));
        assert!(html.contains("Productos</h1>"));
    }

    #[test]
    fn failed_load_renders_escaped_notification() {
        let html = page(View::Entradas, Err("network error: <down>"));
        assert!(html.contains("class=\"toast\""));
        assert!(html.contains("network error: &lt;down&gt;"));
        assert!(!html.contains("<down>"));
    }

    #[test]
    fn expiry_screen_shows_badges_and_escaped_names() {
        let html = expiry_page();
        assert!(html.contains("Fresa &lt;bio&gt;"));
        assert!(!html.contains("<bio>"));
        assert!(html.contains("background:orange"));
        assert!(html.contains("Por caducar"));
        assert!(html.contains("2.00"));
    }

    #[test]
    fn movement_screen_lists_available_stock() {
        let snapshot = ViewSnapshot::Salidas(MovementsView {
            kind: crate::models::MovementKind::Outbound,
            movements: vec![],
            products: vec![ProductOption {
                id: 4,
                name: "Limón & Lima".into(),
                stock: 17,
            }],
        });
        let html = page(View::Salidas, Ok(&snapshot));
        assert!(html.contains("Stock disponible"));
        assert!(html.contains("Limón &amp; Lima"));
        assert!(html.contains("17"));
    }

    #[test]
    fn dashboard_has_welcome_and_link_to_products() {
        let snapshot = ViewSnapshot::Dashboard(DashboardView {
            total_stock: 42,
            near_expiry_count: 0,
            expired_count: 0,
            entradas_count: 0,
            salidas_count: 0,
            recent_entradas: vec![],
            recent_salidas: vec![],
            near_expiry: vec![],
            expired: vec![],
        });
        let html = page(View::Dashboard, Ok(&snapshot));
        assert!(html.contains("Bienvenido a FRUTEX"));
        assert!(html.contains("+ Ir a productos"));
        // Hero link plus the menu entry.
        assert_eq!(html.matches("href=\"/?view=productos\"").count(), 2);
        assert!(html.contains("42"));
    }
}
