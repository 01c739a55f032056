// Scraper for the router's static route table page

use scraper::{ElementRef, Html, Selector};

use super::Route;
use crate::error::{AppError, AppResult};

const ROUTE_TABLE: &str = "#uiViewRouteTable";
const ROUTE_ROWS: &str = "tr:not(.thead)";
/// Class of the single placeholder cell the UI renders for an empty table
const EMPTY_TABLE_MARKER: &str = "txt_center";

fn selector(css: &'static str) -> AppResult<Selector> {
    Selector::parse(css).map_err(|e| AppError::Protocol(format!("bad selector {}: {:?}", css, e)))
}

/// Parse the `static_route_table` page into routes, in display order.
///
/// The row position becomes the route's index, which the router also uses as
/// its slot number when the route is submitted again.
pub fn parse_route_table(html: &str) -> AppResult<Vec<Route>> {
    let document = Html::parse_document(html);

    let table = document
        .select(&selector(ROUTE_TABLE)?)
        .next()
        .ok_or_else(|| {
            AppError::Protocol(format!("no {} element in route table page", ROUTE_TABLE))
        })?;

    let rows: Vec<ElementRef> = table.select(&selector(ROUTE_ROWS)?).collect();

    if let [only] = rows.as_slice() {
        if is_empty_marker(*only) {
            tracing::debug!("Route table is empty");
            return Ok(Vec::new());
        }
    }

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| parse_row(index, row))
        .collect()
}

fn cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children().filter_map(ElementRef::wrap).collect()
}

fn is_empty_marker(row: ElementRef<'_>) -> bool {
    cells(row)
        .first()
        .is_some_and(|cell| cell.value().classes().any(|c| c == EMPTY_TABLE_MARKER))
}

fn parse_row(index: usize, row: ElementRef<'_>) -> AppResult<Route> {
    let cells = cells(row);
    let [active, network, mask, gateway, ..] = cells.as_slice() else {
        return Err(AppError::Protocol(format!(
            "route table row {} has {} cells, expected at least 4",
            index,
            cells.len()
        )));
    };

    let is_active = active
        .children()
        .filter_map(ElementRef::wrap)
        .next()
        .is_some_and(|checkbox| checkbox.value().attr("checked").is_some());

    let route = Route::new(
        Some(index),
        &cell_text(*network),
        &cell_text(*mask),
        &cell_text(*gateway),
        is_active,
    )?;
    tracing::trace!("Parsed {}", route);
    Ok(route)
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_ROUTES: &str = r#"
        <div>
        <table id="uiViewRouteTable" class="zebra">
          <tr class="thead">
            <th class="c1">Aktiv</th><th>Netzwerk</th><th>Subnetzmaske</th><th>Gateway</th><th></th>
          </tr>
          <tr>
            <td class="c1"><input type="checkbox" name="route_activ0" checked></td>
            <td>10.8.0.0</td>
            <td>255.255.255.0</td>
            <td>192.168.178.2</td>
            <td class="btncolumn"><button type="submit" name="edit" value="route0"></button></td>
          </tr>
          <tr>
            <td class="c1"><input type="checkbox" name="route_activ1"></td>
            <td> 172.16.0.0 </td>
            <td>255.240.0.0</td>
            <td>192.168.178.254</td>
            <td class="btncolumn"></td>
          </tr>
        </table>
        </div>"#;

    const EMPTY: &str = r#"
        <table id="uiViewRouteTable">
          <tr class="thead"><th>Aktiv</th><th>Netzwerk</th><th>Subnetzmaske</th><th>Gateway</th></tr>
          <tr><td class="txt_center" colspan="5">Es sind keine statischen Routen eingerichtet.</td></tr>
        </table>"#;

    #[test]
    fn test_parse_rows_in_order() {
        let routes = parse_route_table(TWO_ROUTES).unwrap();
        assert_eq!(routes.len(), 2);

        assert_eq!(routes[0].index(), Some(0));
        assert!(routes[0].is_active());
        assert_eq!(routes[0].network().octets(), [10, 8, 0, 0]);
        assert_eq!(routes[0].gateway().octets(), [192, 168, 178, 2]);

        assert_eq!(routes[1].index(), Some(1));
        assert!(!routes[1].is_active());
        assert_eq!(routes[1].network().octets(), [172, 16, 0, 0]);
        assert_eq!(routes[1].subnet_mask().octets(), [255, 240, 0, 0]);
    }

    #[test]
    fn test_empty_marker_row() {
        assert!(parse_route_table(EMPTY).unwrap().is_empty());
    }

    #[test]
    fn test_header_only_table() {
        let html = r#"<table id="uiViewRouteTable"><tr class="thead"><th>Aktiv</th></tr></table>"#;
        assert!(parse_route_table(html).unwrap().is_empty());
    }

    #[test]
    fn test_missing_table_is_protocol_error() {
        let html = "<html><body><form id=\"uiLogin\"></form></body></html>";
        assert!(matches!(parse_route_table(html), Err(AppError::Protocol(_))));
    }

    #[test]
    fn test_short_row_is_protocol_error() {
        let html = r#"<table id="uiViewRouteTable"><tr><td>x</td><td>10.0.0.0</td></tr></table>"#;
        assert!(matches!(parse_route_table(html), Err(AppError::Protocol(_))));
    }

    #[test]
    fn test_bad_address_in_row() {
        let html = r#"<table id="uiViewRouteTable"><tr>
            <td><input type="checkbox"></td><td>10.0.0</td><td>255.0.0.0</td><td>10.0.0.1</td>
        </tr></table>"#;
        assert!(matches!(parse_route_table(html), Err(AppError::InvalidAddress(_))));
    }
}
