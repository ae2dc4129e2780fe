/// 商品目录资源枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogResource {
    /// 店铺列表
    Shops,
    /// 商品蓝图列表
    Blueprints,
}

static RESOURCES: phf::Map<&'static str, CatalogResource> = phf::phf_map! {
    "shops" => CatalogResource::Shops,
    "blueprints" => CatalogResource::Blueprints,
};

impl CatalogResource {
    /// 从路由参数解析资源名，未知名称返回 None
    pub fn from_name(name: &str) -> Option<Self> {
        RESOURCES.get(name).copied()
    }

    /// 路由中使用的名称
    pub fn name(self) -> &'static str {
        match self {
            CatalogResource::Shops => "shops",
            CatalogResource::Blueprints => "blueprints",
        }
    }

    /// 相对于上游 API 根地址的路径
    pub fn upstream_path(self) -> &'static str {
        match self {
            CatalogResource::Shops => "shops.json",
            CatalogResource::Blueprints => "catalog/blueprints.json",
        }
    }
}
