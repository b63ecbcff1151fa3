#[cfg(feature = "config")]
use std::path::PathBuf;
use std::{collections::BTreeMap, net::IpAddr};

use essentials::info;
#[cfg(feature = "config")]
use pathway::config::RoutesConfig;
use pathway::{
    http::{Reply, Request, Response},
    template::Data,
    Handlers, Param, Params, Pattern, Result, RouteSpec, Router,
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "pathway", about = "Serves path-template routes over HTTP")]
struct Opt {
    #[structopt(long, default_value = "127.0.0.1")]
    host: IpAddr,
    #[structopt(long, default_value = "7878")]
    port: u16,
    #[structopt(long, default_value = "9000")]
    health_check_port: u16,
    /// JSON route file replacing the sample route
    #[cfg(feature = "config")]
    #[structopt(long, parse(from_os_str))]
    routes: Option<PathBuf>,
}

struct MyController;

impl MyController {
    fn get_page(&self, request: &Request, mut response: Response) -> Result<Reply> {
        response.add(pre_params(&request.params));
        response.add(pre_data(&request.data));
        response.send(301)
    }

    fn post_page(&self, request: &Request, mut response: Response) -> Result<Reply> {
        response.add(pre_params(&request.params));
        response.add(pre_data(&request.data));
        response.send(200)
    }
}

fn pre_params(params: &Params) -> String {
    format!("<pre>{:#?}</pre>", params.iter().collect::<BTreeMap<_, _>>())
}

fn pre_data(data: &Data) -> String {
    format!("<pre>{:#?}</pre>", data.iter().collect::<BTreeMap<_, _>>())
}

fn handle_year(raw: &str) -> Option<Param> {
    (raw.len() == 4 && raw.bytes().all(|b| b.is_ascii_digit())).then(|| {
        Param::Map(BTreeMap::from([
            ("year".to_string(), raw.to_string()),
            ("decade".to_string(), format!("{}0s", &raw[..3])),
        ]))
    })
}

fn handlers() -> Handlers {
    let mut handlers = Handlers::new();
    handlers.transform("handle_year", handle_year);
    handlers.load("controllers/mycontroller", |module| {
        module
            .target("MyController", || MyController)
            .method("getPage", MyController::get_page)
            .method("postPage", MyController::post_page);
    });
    handlers
}

fn sample_route() -> RouteSpec {
    RouteSpec::new("/pages/{id}/{categories}/{name}/{year}")
        .pattern("id", Pattern::Digit)
        .pattern("categories", Pattern::Args)
        .pattern("name", Pattern::Any)
        .pattern("year", Pattern::transform(handle_year))
        .get("MyController::getPage")
        .post("MyController::postPage")
        .file("controllers/mycontroller")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    essentials::install();
    let opt = Opt::from_args();
    let builder = Router::builder().handlers(handlers());
    #[cfg(feature = "config")]
    let builder = match &opt.routes {
        Some(path) => builder.configure(&RoutesConfig::from_file(path)?)?,
        None => builder.add_route(sample_route()),
    };
    #[cfg(not(feature = "config"))]
    let builder = builder.add_route(sample_route());
    let router = builder.build()?;
    info!(host = %opt.host, port = opt.port, routes = router.table().len(), "Serving");
    pathway::builder(router)
        .with_host(opt.host)
        .with_app_port(opt.port)
        .with_health_check_port(opt.health_check_port)
        .build()
        .run()
        .await;
    Ok(())
}
