pub mod forecast_routes;
